//! Monthly mean PM2.5 per city, year and month from daily or hourly files.

use crate::combine::round2;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Writer};
use log::warn;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;

const DATE_COLUMNS: [&str; 5] = ["date", "datetime", "timestamp", "time", "datelocal"];
const PM_COLUMNS: [&str; 6] = ["PM2.5", "PM2_5", "pm25", "pm_2_5", "value", "pm2"];
const CITY_COLUMNS: [&str; 4] = ["city", "station", "location", "site"];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

fn alnum_lower(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Exact, then case-insensitive, then alphanumeric-substring header match.
fn find_column(header: &StringRecord, candidates: &[&str]) -> Option<usize> {
    let headers: Vec<&str> = header.iter().map(str::trim).collect();
    if let Some(i) = candidates.iter().find_map(|c| headers.iter().position(|h| h == c)) {
        return Some(i);
    }
    if let Some(i) = candidates
        .iter()
        .find_map(|c| headers.iter().position(|h| h.eq_ignore_ascii_case(c)))
    {
        return Some(i);
    }
    let normalized: Vec<String> = candidates.iter().map(|c| alnum_lower(c)).collect();
    headers.iter().position(|h| {
        let h = alnum_lower(h);
        !h.is_empty() && normalized.iter().any(|c| !c.is_empty() && (h.contains(c.as_str()) || c.contains(h.as_str())))
    })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
                .map(|dt| dt.date())
        })
}

/// Strip thousands separators and unit suffixes before parsing.
fn clean_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | 'e' | 'E'))
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// City name guessed from a file name: "Ho_Chi-Minh.csv" -> "Ho Chi Minh"
fn city_from_file_name(name: &str) -> String {
    let stem = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = stem.rsplit_once('.').map(|(s, _)| s).unwrap_or(stem);
    stem.replace(['_', '-'], " ").trim().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAverage {
    pub city: String,
    pub year: i32,
    pub month: u32,
    /// Mean PM2.5, rounded to 2 decimals
    pub value: f64,
}

/// Accumulates readings per (city, year, month).
#[derive(Default)]
pub struct MonthlyRollup {
    groups: BTreeMap<(String, i32, u32), (f64, usize)>,
}

impl MonthlyRollup {
    pub fn new() -> Self {
        MonthlyRollup::default()
    }

    /// Add one file. The city comes from `city_override`, a city column, or
    /// the file name, in that order. Returns the number of rows used.
    pub fn add_file(&mut self, name: &str, text: &str, city_override: Option<&str>) -> usize {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.trim_start_matches('\u{feff}').as_bytes());
        let header = match rdr.headers() {
            Ok(h) => h.clone(),
            Err(e) => {
                warn!("Skipping {}: {}", name, e);
                return 0;
            }
        };

        let date_col = find_column(&header, &DATE_COLUMNS);
        let year_col = find_column(&header, &["Year"]);
        let month_col = find_column(&header, &["Month"]);
        let day_col = find_column(&header, &["Day"]);
        if date_col.is_none() && (year_col.is_none() || month_col.is_none()) {
            warn!("Could not find or construct a date column in {}", name);
            return 0;
        }
        let Some(pm_col) = find_column(&header, &PM_COLUMNS) else {
            warn!("Could not find PM2.5 column in {}", name);
            return 0;
        };
        let city_col = find_column(&header, &CITY_COLUMNS);
        let file_city = city_from_file_name(name);

        let mut used = 0;
        for record in rdr.records().flatten() {
            let get = |i: Option<usize>| i.and_then(|i| record.get(i)).unwrap_or("").trim();
            let date = match date_col {
                Some(_) => parse_date(get(date_col)),
                None => constructed_date(get(year_col), get(month_col), get(day_col)),
            };
            let Some(date) = date else {
                continue;
            };
            let Some(value) = clean_number(get(Some(pm_col))) else {
                continue;
            };
            let city = match (city_override, city_col) {
                (Some(city), _) => city.to_string(),
                (None, Some(_)) => get(city_col).to_string(),
                (None, None) => file_city.clone(),
            };
            let entry = self.groups.entry((city, date.year(), date.month())).or_default();
            entry.0 += value;
            entry.1 += 1;
            used += 1;
        }
        used
    }

    /// Averages sorted by city, year and month.
    pub fn finish(self) -> Vec<MonthlyAverage> {
        self.groups
            .into_iter()
            .map(|((city, year, month), (sum, count))| MonthlyAverage {
                city,
                year,
                month,
                value: round2(sum / count as f64),
            })
            .collect()
    }
}

/// Build a date from Year/Month[/Day] cells; Month may be "YYYY-MM".
fn constructed_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    if let Some((y, m)) = month.split_once('-') {
        return NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1);
    }
    let day = if day.is_empty() { 1 } else { day.parse().ok()? };
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day)
}

/// Columns: Month (YYYY-MM), Year, Month_num, PM2.5, City
pub fn write_monthly_csv<W: io::Write>(rows: &[MonthlyAverage], writer: W) -> csv::Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["Month", "Year", "Month_num", "PM2.5", "City"])?;
    for row in rows {
        wtr.write_record([
            format!("{:04}-{:02}", row.year, row.month),
            row.year.to_string(),
            row.month.to_string(),
            row.value.to_string(),
            row.city.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aero_core::monthly::parse_monthly_csv;

    #[test]
    fn test_rollup_from_date_column() {
        let text = "Date,City,PM2.5 (avg)\n2021-01-01,Hanoi,10\n2021-01-02,Hanoi,21\n2021-02-01,Hanoi,\"1,000\"\n2021-02-02,Hanoi,n/a\n";
        let mut rollup = MonthlyRollup::new();
        assert_eq!(rollup.add_file("hanoi.csv", text, None), 3);
        let rows = rollup.finish();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value, 15.5);
        assert_eq!(rows[1].value, 1000.0);
    }

    #[test]
    fn test_rollup_constructs_dates_and_guesses_city() {
        let text = "Site,Year,Month,Day,PM2.5\nX,2021,3,15,12.3\nX,2021,3,16,12.4\n";
        let mut rollup = MonthlyRollup::new();
        rollup.add_file("data/Ho_Chi-Minh.csv", text, Some("HCMC"));
        let rows = rollup.finish();
        assert_eq!(rows[0].city, "HCMC");
        assert_eq!(rows[0].value, 12.35);

        let text = "Year,Month,value\n2020,2020-07,4\n";
        let mut rollup = MonthlyRollup::new();
        rollup.add_file("data/Ho_Chi-Minh.csv", text, None);
        let rows = rollup.finish();
        assert_eq!(rows[0].city, "Ho Chi Minh");
        assert_eq!((rows[0].year, rows[0].month), (2020, 7));
    }

    #[test]
    fn test_output_is_readable_as_monthly_csv() {
        let rows = vec![MonthlyAverage {
            city: "Hanoi".to_string(),
            year: 2021,
            month: 3,
            value: 42.5,
        }];
        let mut out = Vec::new();
        write_monthly_csv(&rows, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let records = parse_monthly_csv(Some(&text));
        assert_eq!(records[0].month, "March");
        assert_eq!(records[0].year, Some(2021));
        assert_eq!(records[0].value, Some(42.5));
    }

    #[test]
    fn test_file_without_dates_is_skipped() {
        let mut rollup = MonthlyRollup::new();
        assert_eq!(rollup.add_file("x.csv", "City,PM2.5\nHanoi,3\n", None), 0);
    }
}
