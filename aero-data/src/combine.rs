//! Combine raw monitoring-station exports into an hourly report.
//!
//! Each input file may name its columns differently. Rows with a negative or
//! missing concentration, or a QC flag of `invalid`, are dropped. Remaining
//! rows are grouped by site, parameter, date and hour.

use crate::category::AqiCategory;
use chrono::{Datelike, NaiveDateTime, Timelike};
use csv::{ReaderBuilder, StringRecord, Writer};
use log::{info, warn};
use std::collections::BTreeMap;
use std::io;

const SITE_COLUMNS: [&str; 2] = ["Site", "Station"];
const PARAMETER_COLUMNS: [&str; 2] = ["Parameter", "Pollutant"];
const YEAR_COLUMNS: [&str; 1] = ["Year"];
const MONTH_COLUMNS: [&str; 1] = ["Month"];
const DAY_COLUMNS: [&str; 1] = ["Day"];
const HOUR_COLUMNS: [&str; 3] = ["Hour", "Hour24", "HH"];
const DATETIME_COLUMNS: [&str; 4] = ["DateTime", "Timestamp", "Date (LT)", "Time"];
const RAW_COLUMNS: [&str; 5] = ["Raw Conc.", "Raw Conc", "RawConc", "Raw_Conc", "PM2.5"];
const AQI_COLUMNS: [&str; 1] = ["AQI"];
const QC_COLUMNS: [&str; 3] = ["QC Name", "QC_Name", "QC"];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M %p",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
];

/// Header lookup ignoring case, trying candidates in order.
fn find_column(header: &StringRecord, candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|cand| {
        header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(cand))
    })
}

fn parse_number(record: &StringRecord, idx: Option<usize>) -> Option<f64> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// First four-digit run in a file name, used when a file has no year column.
fn year_from_name(name: &str) -> Option<i32> {
    let bytes = name.as_bytes();
    bytes
        .windows(4)
        .position(|w| w.iter().all(u8::is_ascii_digit))
        .and_then(|start| name[start..start + 4].parse().ok())
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HourlyKey {
    pub site: String,
    pub parameter: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

/// One output row of the hourly report.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyRow {
    pub key: HourlyKey,
    /// Mean concentration, rounded to 2 decimals
    pub pm25: f64,
    /// Mean AQI, rounded
    pub aqi: Option<i64>,
    pub category: AqiCategory,
    pub observations: usize,
}

#[derive(Default)]
struct Accumulator {
    conc_sum: f64,
    conc_count: usize,
    aqi_sum: f64,
    aqi_count: usize,
}

/// Groups rows from any number of station exports.
#[derive(Default)]
pub struct HourlyCombiner {
    groups: BTreeMap<HourlyKey, Accumulator>,
    files_used: usize,
}

impl HourlyCombiner {
    pub fn new() -> Self {
        HourlyCombiner::default()
    }

    /// Add one CSV export; `name` is used for logging and year inference.
    pub fn add_file(&mut self, name: &str, text: &str) {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.trim_start_matches('\u{feff}').as_bytes());
        let header = match rdr.headers() {
            Ok(h) => h.clone(),
            Err(e) => {
                warn!("Skipping {}: {}", name, e);
                return;
            }
        };

        let site_col = find_column(&header, &SITE_COLUMNS);
        let param_col = find_column(&header, &PARAMETER_COLUMNS);
        let raw_col = find_column(&header, &RAW_COLUMNS);
        let (Some(site_col), Some(param_col), Some(raw_col)) = (site_col, param_col, raw_col) else {
            warn!("Skipping (missing required cols Site/Parameter/RawConc): {}", name);
            return;
        };
        let year_col = find_column(&header, &YEAR_COLUMNS);
        let month_col = find_column(&header, &MONTH_COLUMNS);
        let day_col = find_column(&header, &DAY_COLUMNS);
        let hour_col = find_column(&header, &HOUR_COLUMNS);
        let datetime_col = find_column(&header, &DATETIME_COLUMNS);
        let aqi_col = find_column(&header, &AQI_COLUMNS);
        let qc_col = find_column(&header, &QC_COLUMNS);
        let inferred_year = year_from_name(name);

        let mut kept = 0usize;
        for record in rdr.records().flatten() {
            let Some(conc) = parse_number(&record, Some(raw_col)).filter(|c| *c >= 0.0) else {
                continue;
            };
            if let Some(qc) = qc_col.and_then(|i| record.get(i)) {
                if qc.trim().eq_ignore_ascii_case("invalid") {
                    continue;
                }
            }

            let stamp = datetime_col
                .and_then(|i| record.get(i))
                .and_then(parse_datetime);
            let part = |col: Option<usize>, from_stamp: Option<u32>| {
                parse_number(&record, col).map(|v| v as u32).or(from_stamp)
            };
            let year = parse_number(&record, year_col)
                .map(|v| v as i32)
                .or_else(|| stamp.map(|s| s.year()))
                .or(inferred_year);
            let month = part(month_col, stamp.map(|s| s.month()));
            let day = part(day_col, stamp.map(|s| s.day()));
            let hour = part(hour_col, stamp.map(|s| s.hour())).unwrap_or(0);
            let (Some(year), Some(month), Some(day)) = (year, month, day) else {
                continue;
            };

            let key = HourlyKey {
                site: record.get(site_col).unwrap_or("").trim().to_string(),
                parameter: record.get(param_col).unwrap_or("").trim().to_string(),
                year,
                month,
                day,
                hour,
            };
            let acc = self.groups.entry(key).or_default();
            acc.conc_sum += conc;
            acc.conc_count += 1;
            if let Some(aqi) = parse_number(&record, aqi_col) {
                acc.aqi_sum += aqi;
                acc.aqi_count += 1;
            }
            kept += 1;
        }
        if kept > 0 {
            self.files_used += 1;
        }
        info!("{}: kept {} rows", name, kept);
    }

    pub fn files_used(&self) -> usize {
        self.files_used
    }

    /// Rows sorted by site, parameter, date and hour.
    pub fn finish(self) -> Vec<HourlyRow> {
        self.groups
            .into_iter()
            .map(|(key, acc)| {
                let pm25 = round2(acc.conc_sum / acc.conc_count as f64);
                let aqi = (acc.aqi_count > 0).then(|| (acc.aqi_sum / acc.aqi_count as f64).round() as i64);
                let category = match aqi {
                    Some(aqi) => AqiCategory::from_aqi(aqi as f64),
                    None => AqiCategory::from_pm25(pm25),
                };
                HourlyRow {
                    key,
                    pm25,
                    aqi,
                    category,
                    observations: acc.conc_count,
                }
            })
            .collect()
    }
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Write the report with the columns the map index reads.
pub fn write_hourly_csv<W: io::Write>(rows: &[HourlyRow], writer: W) -> csv::Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record([
        "Site",
        "Parameter",
        "Year",
        "Month",
        "Day",
        "Hour",
        "PM2.5 (avg)",
        "Category",
        "Observations",
    ])?;
    for row in rows {
        wtr.write_record([
            row.key.site.clone(),
            row.key.parameter.clone(),
            row.key.year.to_string(),
            row.key.month.to_string(),
            row.key.day.to_string(),
            row.key.hour.to_string(),
            row.pm25.to_string(),
            row.category.label().to_string(),
            row.observations.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aero_core::index::TimeSeriesIndex;
    use aero_core::timestamp::Timestamp;

    const EXPORT: &str = "Site,Parameter,Date (LT),Year,Month,Day,Hour,AQI,Raw Conc.,QC Name\n\
        Hanoi,PM2.5,2021-01-01 01:00 AM,2021,1,1,1,150,55.0,Valid\n\
        Hanoi,PM2.5,2021-01-01 01:00 AM,2021,1,1,1,160,65.0,Valid\n\
        Hanoi,PM2.5,2021-01-01 02:00 AM,2021,1,1,2,-999,-999,Missing\n\
        Hanoi,PM2.5,2021-01-01 03:00 AM,2021,1,1,3,80,25.0,Invalid\n\
        Hanoi,PM2.5,2021-01-01 04:00 AM,2021,1,1,4,,8.0,\n";

    #[test]
    fn test_combine_groups_and_filters() {
        let mut combiner = HourlyCombiner::new();
        combiner.add_file("Hanoi_PM2.5_2021_01.csv", EXPORT);
        let rows = combiner.finish();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].key.hour, 1);
        assert_eq!(rows[0].pm25, 60.0);
        assert_eq!(rows[0].aqi, Some(155));
        assert_eq!(rows[0].category, AqiCategory::Unhealthy);
        assert_eq!(rows[0].observations, 2);

        // no AQI: category from concentration
        assert_eq!(rows[1].key.hour, 4);
        assert_eq!(rows[1].aqi, None);
        assert_eq!(rows[1].category, AqiCategory::Good);
    }

    #[test]
    fn test_datetime_and_filename_fallbacks() {
        let text = "Station,Pollutant,DateTime,RawConc\nManila,PM2.5,2022-05-03 07:00:00,12.5\n";
        let mut combiner = HourlyCombiner::new();
        combiner.add_file("manila.csv", text);
        let rows = combiner.finish();
        assert_eq!(rows[0].key.year, 2022);
        assert_eq!(rows[0].key.month, 5);
        assert_eq!(rows[0].key.hour, 7);

        let text = "Site,Parameter,Month,Day,Raw Conc\nManila,PM2.5,6,1,10\n";
        let mut combiner = HourlyCombiner::new();
        combiner.add_file("Manila_2019.csv", text);
        let rows = combiner.finish();
        assert_eq!(rows[0].key.year, 2019);
        assert_eq!(rows[0].key.hour, 0);
    }

    #[test]
    fn test_missing_required_columns_skips_file() {
        let mut combiner = HourlyCombiner::new();
        combiner.add_file("bad.csv", "Site,Year\nHanoi,2021\n");
        assert_eq!(combiner.files_used(), 0);
        assert!(combiner.finish().is_empty());
    }

    #[test]
    fn test_report_feeds_index() {
        let mut combiner = HourlyCombiner::new();
        combiner.add_file("Hanoi_2021.csv", EXPORT);
        let rows = combiner.finish();
        let mut out = Vec::new();
        write_hourly_csv(&rows, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Site,Parameter,Year,Month,Day,Hour,PM2.5 (avg),Category,Observations\n"));

        let index = TimeSeriesIndex::from_csv(&text);
        let ts = Timestamp::from_ymdh(2021, 1, 1, 1).unwrap();
        assert_eq!(index.get("Hanoi", &ts), Some(60.0));
    }
}
