use crate::error::AeroError;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Canonical observation timestamp format: "YYYY-MM-DDTHH:00:00"
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// An hourly observation timestamp.
///
/// Ordering matches the lexicographic order of the canonical string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Build a timestamp from raw CSV fields.
    ///
    /// Month and day default to 1 and hour to 0 when empty. Returns `None`
    /// when the parts do not form a calendar date.
    pub fn from_parts(year: &str, month: &str, day: &str, hour: &str) -> Option<Timestamp> {
        let year: i32 = year.trim().parse().ok()?;
        let month: u32 = parse_or(month, 1)?;
        let day: u32 = parse_or(day, 1)?;
        let hour: u32 = parse_or(hour, 0)?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
        Some(Timestamp(NaiveDateTime::new(date, time)))
    }

    pub fn from_ymdh(year: i32, month: u32, day: u32, hour: u32) -> Option<Timestamp> {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
        Some(Timestamp(NaiveDateTime::new(date, time)))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.0.year(),
            month: self.0.month(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }
}

fn parse_or(raw: &str, default: u32) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        Some(default)
    } else {
        raw.parse().ok()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = AeroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
            .map(Timestamp)
            .map_err(|_| AeroError::InvalidTimestamp(s.to_string()))
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Timestamp(value)
    }
}

/// A calendar month of a specific year, displayed as "YYYY-MM".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<YearMonth> {
        (1..=12).contains(&month).then_some(YearMonth { year, month })
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = AeroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AeroError::InvalidYearMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}

/// Distinct calendar parts present in a set of timestamps, each ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateParts {
    pub years: Vec<i32>,
    pub months: Vec<YearMonth>,
    pub days: Vec<NaiveDate>,
}

impl DateParts {
    pub fn from_timestamps<'a>(timestamps: impl IntoIterator<Item = &'a Timestamp>) -> DateParts {
        let mut years = BTreeSet::new();
        let mut months = BTreeSet::new();
        let mut days = BTreeSet::new();
        for ts in timestamps {
            years.insert(ts.year());
            months.insert(ts.year_month());
            days.insert(ts.date());
        }
        DateParts {
            years: years.into_iter().collect(),
            months: months.into_iter().collect(),
            days: days.into_iter().collect(),
        }
    }

    /// Months of the given year.
    pub fn months_in_year(&self, year: i32) -> Vec<YearMonth> {
        self.months.iter().copied().filter(|ym| ym.year == year).collect()
    }

    /// Days of the given month.
    pub fn days_in_month(&self, month: YearMonth) -> Vec<NaiveDate> {
        self.days.iter().copied().filter(|d| month.contains(d)).collect()
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.years.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_defaults() {
        let ts = Timestamp::from_parts("2021", "", "", "").unwrap();
        assert_eq!(ts.to_string(), "2021-01-01T00:00:00");
        let ts = Timestamp::from_parts("2021", "3", "15", "7").unwrap();
        assert_eq!(ts.to_string(), "2021-03-15T07:00:00");
    }

    #[test]
    fn test_from_parts_rejects_bad_dates() {
        assert!(Timestamp::from_parts("", "1", "1", "0").is_none());
        assert!(Timestamp::from_parts("2021", "2", "30", "0").is_none());
        assert!(Timestamp::from_parts("2021", "x", "1", "0").is_none());
        assert!(Timestamp::from_parts("2021", "1", "1", "24").is_none());
    }

    #[test]
    fn test_parse_and_order() {
        let a: Timestamp = "2021-03-15T00:00:00".parse().unwrap();
        let b: Timestamp = "2021-03-15T01:00:00".parse().unwrap();
        assert!(a < b);
        assert_eq!(a.year_month().to_string(), "2021-03");
        assert!("2021-03-15".parse::<Timestamp>().is_err());
    }

    #[test]
    fn test_year_month_parse() {
        let ym: YearMonth = "2021-03".parse().unwrap();
        assert_eq!(ym, YearMonth { year: 2021, month: 3 });
        assert!("2021-13".parse::<YearMonth>().is_err());
        assert!("2021".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_date_parts() {
        let stamps: Vec<Timestamp> = [
            "2021-03-15T00:00:00",
            "2020-12-31T23:00:00",
            "2021-03-15T05:00:00",
            "2021-04-01T00:00:00",
        ]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
        let parts = DateParts::from_timestamps(&stamps);
        assert_eq!(parts.years, vec![2020, 2021]);
        assert_eq!(parts.months.len(), 3);
        assert_eq!(parts.days.len(), 3);
        assert_eq!(parts.months_in_year(2021).len(), 2);
        let march = YearMonth::new(2021, 3).unwrap();
        assert_eq!(parts.days_in_month(march), vec![NaiveDate::from_ymd_opt(2021, 3, 15).unwrap()]);
        assert_eq!(parts.latest_year(), Some(2021));
    }
}
