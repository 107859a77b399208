//! Locating and reading input CSV files.

use aero_utils::compression::{decode_text, is_gzip_name};
use anyhow::Context;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// `.csv` and `.csv.gz` files, case-insensitive.
pub fn is_csv(path: &Path) -> bool {
    let name = file_name(path).to_ascii_lowercase();
    name.ends_with(".csv") || name.ends_with(".csv.gz")
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn walk(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                walk(&path, recursive, out)?;
            } else {
                debug!("Skipping subdirectory {}", path.display());
            }
        } else if is_csv(&path) {
            out.push(path);
        }
    }
    Ok(())
}

/// Expand files and directories into a sorted list of CSV files.
pub fn collect_csv_files(inputs: &[PathBuf], recursive: bool) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            walk(input, recursive, &mut files)?;
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            anyhow::bail!("Input {} does not exist", input.display());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Read a file as UTF-8 text, gunzipping `.gz` files.
pub fn read_text(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    decode_text(&bytes, is_gzip_name(&file_name(path)))
}
