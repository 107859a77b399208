//! Preparing raw station exports for the web apps.

use crate::files::{collect_csv_files, file_name, read_text};
use aero_data::combine::{write_hourly_csv, HourlyCombiner};
use aero_data::rollup::{write_monthly_csv, MonthlyRollup};
use aero_data::union::CsvUnion;
use anyhow::{bail, Context};
use log::{info, warn};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Files that fail to read are logged and skipped.
fn read_all(files: &[PathBuf]) -> Vec<(String, String)> {
    files
        .iter()
        .filter_map(|path| match read_text(path) {
            Ok(text) => Some((file_name(path), text)),
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                None
            }
        })
        .collect()
}

fn create(output: &Path) -> anyhow::Result<BufWriter<File>> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(output).with_context(|| format!("Failed to create {}", output.display()))?;
    Ok(BufWriter::new(file))
}

pub fn run_combine_hourly(inputs: &[PathBuf], output: &Path) -> anyhow::Result<()> {
    let files = collect_csv_files(inputs, false)?;
    if files.is_empty() {
        bail!("No CSV files found");
    }
    let mut combiner = HourlyCombiner::new();
    for (name, text) in read_all(&files) {
        combiner.add_file(&name, &text);
    }
    info!("Used {} of {} files", combiner.files_used(), files.len());
    let rows = combiner.finish();
    if rows.is_empty() {
        bail!("No hourly PM2.5 rows found in {} files", files.len());
    }
    write_hourly_csv(&rows, create(output)?)?;
    info!("Wrote {} hourly rows to {}", rows.len(), output.display());
    Ok(())
}

pub fn run_monthly_averages(inputs: &[PathBuf], output: &Path, city: Option<&str>) -> anyhow::Result<()> {
    let files = collect_csv_files(inputs, false)?;
    if files.is_empty() {
        bail!("No CSV files found");
    }
    let mut rollup = MonthlyRollup::new();
    let mut rows_read = 0;
    for (name, text) in read_all(&files) {
        rows_read += rollup.add_file(&name, &text, city);
    }
    let averages = rollup.finish();
    if averages.is_empty() {
        bail!("No dated PM2.5 rows found in {} files", files.len());
    }
    write_monthly_csv(&averages, create(output)?)?;
    info!(
        "Averaged {} rows into {} city-months at {}",
        rows_read,
        averages.len(),
        output.display()
    );
    Ok(())
}

pub fn run_combine(input_dir: &Path, output: &Path, recursive: bool, include_filename: bool) -> anyhow::Result<()> {
    if !input_dir.is_dir() {
        bail!("{} is not a directory", input_dir.display());
    }
    let files = collect_csv_files(&[input_dir.to_path_buf()], recursive)?;
    // never read back a previous run's output
    let output_abs = output.canonicalize().ok();
    let files: Vec<PathBuf> = files
        .into_iter()
        .filter(|f| output_abs.is_none() || f.canonicalize().ok() != output_abs)
        .collect();
    if files.is_empty() {
        bail!("No CSV files found in {}", input_dir.display());
    }

    let mut union = CsvUnion::new(include_filename);
    for (name, text) in read_all(&files) {
        let rows = union.add_file(&name, &text);
        info!("{}: {} rows", name, rows);
    }
    if union.is_empty() {
        bail!("No rows found in {} files", files.len());
    }
    union.write(create(output)?)?;
    info!(
        "Wrote {} rows with {} columns to {}",
        union.len(),
        union.headers().len(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::tests::scratch_dir;
    use std::fs;

    #[test]
    fn test_combine_writes_header_union() {
        let dir = scratch_dir("union");
        fs::write(dir.join("a.csv"), "Site,PM2.5\nHanoi,10\n").unwrap();
        fs::write(dir.join("b.csv"), "Site,Year\nManila,2021\n").unwrap();
        let output = dir.join("out").join("combined.csv");

        run_combine(&dir, &output, false, true).unwrap();
        let text = fs::read_to_string(&output).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.contains("Site"));
        assert!(header.contains("PM2.5"));
        assert!(header.contains("Year"));
        assert!(header.contains("source_file"));
        assert_eq!(lines.count(), 2);

        // rerunning does not pick up the previous output
        let flat = dir.join("combined.csv");
        run_combine(&dir, &flat, false, false).unwrap();
        run_combine(&dir, &flat, false, false).unwrap();
        assert_eq!(fs::read_to_string(&flat).unwrap().lines().count(), 3);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_inputs_are_errors() {
        let dir = scratch_dir("empty");
        assert!(run_combine(&dir, &dir.join("out.csv"), false, false).is_err());
        assert!(run_combine_hourly(&[dir.clone()], &dir.join("out.csv")).is_err());
        assert!(run_monthly_averages(&[dir.join("nope")], &dir.join("out.csv"), None).is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
