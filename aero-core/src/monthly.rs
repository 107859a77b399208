use aero_utils::dates::month_name;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

/// One row of a monthly AOD or PM2.5 CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    /// The month/date cell as written in the file
    pub month_raw: String,
    /// Full month name ("March"), or the raw token when it cannot be resolved
    pub month: String,
    pub year: Option<i32>,
    pub value: Option<f64>,
}

/// Parse a monthly CSV whose headers vary between sources.
///
/// The month column is the first header named `month`, `month_name` or
/// `date` (case-insensitive), else column 0. The value column is the first
/// header mentioning PM2.5, else column 1 (column 0 for single-column files).
/// Absent or empty input yields no records.
pub fn parse_monthly_csv(text: Option<&str>) -> Vec<MonthlyRecord> {
    let Some(text) = text else {
        return Vec::new();
    };
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut rows = rdr.records().flatten();

    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
    let month_idx = month_column(&headers);
    let value_idx = value_column(&headers);

    rows.map(|record| {
        let month_raw = record.get(month_idx).unwrap_or("").trim().to_string();
        let value = record
            .get(value_idx)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite());
        let (month, year) = split_month_token(&month_raw);
        MonthlyRecord {
            month_raw,
            month,
            year,
            value,
        }
    })
    .collect()
}

fn month_column(headers: &[String]) -> usize {
    headers
        .iter()
        .position(|h| {
            let h = h.to_ascii_lowercase();
            h == "month" || h == "month_name" || h == "date"
        })
        .unwrap_or(0)
}

fn mentions_pm25(header: &str) -> bool {
    let h = header.to_ascii_lowercase();
    h.contains("pm2") || h.contains("pm_2")
}

fn value_column(headers: &[String]) -> usize {
    match headers.iter().position(|h| mentions_pm25(h)) {
        Some(idx) => idx,
        None if headers.len() > 1 => 1,
        None => 0,
    }
}

/// Split "2021-03", "2021-03-15" or "March 2021" into (month name, year).
fn split_month_token(raw: &str) -> (String, Option<i32>) {
    let bytes = raw.as_bytes();
    let iso_prefix = bytes.len() >= 7
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit);
    if iso_prefix {
        let year = raw[..4].parse::<i32>().ok();
        let month = raw[5..7]
            .parse::<u32>()
            .ok()
            .and_then(month_name)
            .map(str::to_string)
            .unwrap_or_else(|| raw.to_string());
        return (month, year);
    }

    let mut parts = raw.split_whitespace();
    if let (Some(name), Some(rest)) = (parts.next(), parts.next()) {
        let year_digits = rest.get(..4).filter(|y| y.bytes().all(|b| b.is_ascii_digit()));
        if name.chars().all(|c| c.is_ascii_alphabetic()) {
            if let Some(year) = year_digits.and_then(|y| y.parse::<i32>().ok()) {
                return (name.to_string(), Some(year));
            }
        }
    }

    (raw.to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(parse_monthly_csv(None).is_empty());
        assert!(parse_monthly_csv(Some("")).is_empty());
        assert!(parse_monthly_csv(Some("  \n ")).is_empty());
        assert!(parse_monthly_csv(Some("Month,PM2.5")).is_empty());
    }

    #[test]
    fn test_pm25_column_wherever_it_sits() {
        let text = "City,Year,Month,PM2.5\nHanoi,2021,2021-01,48.2\nHanoi,2021,2021-02,\n";
        let rows = parse_monthly_csv(Some(text));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].month, "January");
        assert_eq!(rows[0].year, Some(2021));
        assert_eq!(rows[0].value, Some(48.2));
        assert_eq!(rows[1].value, None);
    }

    #[test]
    fn test_aod_file_without_pm_column() {
        let text = "Month,AOD\nJanuary,0.61\nFebruary,abc\n";
        let rows = parse_monthly_csv(Some(text));
        assert_eq!(rows[0].month, "January");
        assert_eq!(rows[0].year, None);
        assert_eq!(rows[0].value, Some(0.61));
        assert_eq!(rows[1].value, None);
    }

    #[test]
    fn test_month_name_with_year() {
        let text = "date,value\nMarch 2020,12\n";
        let rows = parse_monthly_csv(Some(text));
        assert_eq!(rows[0].month, "March");
        assert_eq!(rows[0].year, Some(2020));
        assert_eq!(rows[0].month_raw, "March 2020");
    }

    #[test]
    fn test_out_of_range_month_keeps_raw() {
        let rows = parse_monthly_csv(Some("Month,PM2.5\n2021-13,5\n"));
        assert_eq!(rows[0].month, "2021-13");
        assert_eq!(rows[0].year, Some(2021));
    }

    #[test]
    fn test_single_column() {
        let rows = parse_monthly_csv(Some("values\n1.5\n2.5\n"));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value, Some(1.5));
        assert_eq!(rows[0].month, "1.5");
    }

    #[test]
    fn test_idempotent() {
        let text = "Month,PM2.5\n2021-01,10\n2021-02,20\n";
        assert_eq!(parse_monthly_csv(Some(text)), parse_monthly_csv(Some(text)));
    }
}
