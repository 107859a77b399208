//! Month-keyed chart series for one site and one year.

use crate::aggregate::{aggregate, Period};
use aero_core::index::TimeSeriesIndex;
use aero_core::monthly::MonthlyRecord;
use aero_core::selection::{Granularity, Window};
use aero_utils::dates::month_from_name;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which lines the dual-axis chart draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeriesMode {
    #[default]
    Aod,
    Pm25,
    Both,
}

impl SeriesMode {
    pub fn shows_aod(&self) -> bool {
        matches!(self, SeriesMode::Aod | SeriesMode::Both)
    }

    pub fn shows_pm25(&self) -> bool {
        matches!(self, SeriesMode::Pm25 | SeriesMode::Both)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesMode::Aod => "aod",
            SeriesMode::Pm25 => "pm25",
            SeriesMode::Both => "both",
        }
    }
}

impl FromStr for SeriesMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aod" => Ok(SeriesMode::Aod),
            "pm25" | "pm2.5" => Ok(SeriesMode::Pm25),
            "both" => Ok(SeriesMode::Both),
            other => Err(format!("unknown series mode: {}", other)),
        }
    }
}

/// Twelve calendar-month slots; `None` marks a month without data.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthlySeries {
    values: [Option<f64>; 12],
}

impl MonthlySeries {
    /// Keep rows without a year or with the requested year, keyed by month
    /// name. Later rows for the same month replace earlier ones; rows whose
    /// month cannot be resolved are ignored.
    pub fn from_records(records: &[MonthlyRecord], year: Option<i32>) -> MonthlySeries {
        let mut series = MonthlySeries::default();
        for record in records {
            if let (Some(want), Some(have)) = (year, record.year) {
                if want != have {
                    continue;
                }
            }
            if let Some(month) = month_from_name(&record.month) {
                series.values[(month - 1) as usize] = record.value;
            }
        }
        series
    }

    /// Monthly means of `site` for `year` from the observation index.
    pub fn from_index(index: &TimeSeriesIndex, site: &str, year: i32) -> MonthlySeries {
        let window = Window {
            year: Some(year),
            month: None,
            day: None,
        };
        let mut series = MonthlySeries::default();
        for pv in aggregate(index, site, Granularity::Month, &window) {
            if let Period::Month(ym) = pv.period {
                series.values[(ym.month - 1) as usize] = Some(pv.value);
            }
        }
        series
    }

    /// Value for a 1-based month.
    pub fn get(&self, month: u32) -> Option<f64> {
        let idx = usize::try_from(month).ok()?.checked_sub(1)?;
        self.values.get(idx).copied().flatten()
    }

    pub fn has_data(&self) -> bool {
        self.values.iter().any(Option::is_some)
    }

    pub fn max(&self) -> Option<f64> {
        self.values.iter().flatten().copied().reduce(f64::max)
    }

    /// (month number, value) for January through December.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Option<f64>)> + '_ {
        self.values.iter().enumerate().map(|(i, v)| (i as u32 + 1, *v))
    }
}
