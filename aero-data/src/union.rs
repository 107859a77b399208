//! Concatenate CSV files under the union of their headers.

use csv::{ReaderBuilder, Writer};
use log::warn;
use std::collections::{HashMap, HashSet};
use std::io;

pub const SOURCE_FILE_COLUMN: &str = "source_file";

/// Rows from many files, keyed by header name.
///
/// Header order is first-seen across files; a row missing a column writes
/// an empty cell.
#[derive(Debug, Default)]
pub struct CsvUnion {
    headers: Vec<String>,
    seen: HashSet<String>,
    rows: Vec<HashMap<String, String>>,
    include_source: bool,
}

impl CsvUnion {
    /// `include_source` appends a `source_file` column naming each row's file.
    pub fn new(include_source: bool) -> Self {
        CsvUnion {
            include_source,
            ..CsvUnion::default()
        }
    }

    fn note_header(&mut self, name: &str) {
        if self.seen.insert(name.to_string()) {
            self.headers.push(name.to_string());
        }
    }

    /// Add one file's text; a leading byte-order mark is ignored.
    pub fn add_file(&mut self, name: &str, text: &str) -> usize {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.trim_start_matches('\u{feff}').as_bytes());
        let header: Vec<String> = match rdr.headers() {
            Ok(h) if !h.is_empty() => h.iter().map(str::to_string).collect(),
            Ok(_) => return 0,
            Err(e) => {
                warn!("failed to read {}: {}", name, e);
                return 0;
            }
        };
        for h in &header {
            self.note_header(h);
        }

        let mut added = 0;
        for record in rdr.records() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    warn!("failed to read {}: {}", name, e);
                    break;
                }
            };
            let mut row: HashMap<String, String> = header
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect();
            if self.include_source {
                row.insert(SOURCE_FILE_COLUMN.to_string(), name.to_string());
                self.note_header(SOURCE_FILE_COLUMN);
            }
            self.rows.push(row);
            added += 1;
        }
        added
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = Writer::from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(
                self.headers
                    .iter()
                    .map(|h| row.get(h).map(String::as_str).unwrap_or("")),
            )?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_of_headers() {
        let mut union = CsvUnion::new(false);
        union.add_file("a.csv", "\u{feff}Site,Year,PM2.5\nHanoi,2020,10\n");
        union.add_file("b.csv", "Year,Site,AQI\n2021,Manila,55\n");
        assert_eq!(union.headers(), &["Site", "Year", "PM2.5", "AQI"]);

        let mut out = Vec::new();
        union.write(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Site,Year,PM2.5,AQI\nHanoi,2020,10,\nManila,2021,,55\n"
        );
    }

    #[test]
    fn test_source_column() {
        let mut union = CsvUnion::new(true);
        assert_eq!(union.add_file("a.csv", "x\n1\n2\n"), 2);
        union.add_file("b.csv", "y\n3\n");
        assert_eq!(union.headers(), &["x", "source_file", "y"]);
        let mut out = Vec::new();
        union.write(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "x,source_file,y\n1,a.csv,\n2,a.csv,\n,b.csv,3\n"
        );
        assert_eq!(union.len(), 3);
    }
}
