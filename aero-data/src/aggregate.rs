//! Per-period values for one site at hour, day or month granularity.

use aero_core::catalog::{cities_for_region, HighlightCity};
use aero_core::index::TimeSeriesIndex;
use aero_core::region::Region;
use aero_core::selection::{Granularity, Window};
use aero_core::timestamp::{Timestamp, YearMonth};
use aero_utils::dates::{format_day_label, format_month_label};
use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeMap;

/// The time bucket a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    Hour(Timestamp),
    Day(NaiveDate),
    Month(YearMonth),
}

impl Period {
    /// Sortable key: the canonical timestamp, "YYYY-MM-DD" or "YYYY-MM".
    pub fn key(&self) -> String {
        match self {
            Period::Hour(ts) => ts.to_string(),
            Period::Day(d) => d.format("%Y-%m-%d").to_string(),
            Period::Month(ym) => ym.to_string(),
        }
    }

    /// Short label: "MM/YY" for months, "DD/MM/YY" for days, "DD/MM/YY HH:00" for hours.
    pub fn label(&self) -> String {
        match self {
            Period::Hour(ts) => format!("{} {:02}:00", format_day_label(&ts.date()), ts.hour()),
            Period::Day(d) => format_day_label(d),
            Period::Month(ym) => format_month_label(ym.year, ym.month),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodValue {
    pub period: Period,
    pub value: f64,
}

/// Mean of the present values; `None` when there are none.
pub fn mean(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

fn grouped<K: Ord + Copy>(
    rows: impl Iterator<Item = (K, Option<f64>)>,
    to_period: impl Fn(K) -> Period,
) -> Vec<PeriodValue> {
    let mut groups: BTreeMap<K, Vec<Option<f64>>> = BTreeMap::new();
    for (key, value) in rows {
        groups.entry(key).or_default().push(value);
    }
    groups
        .into_iter()
        .filter_map(|(key, values)| {
            mean(values).map(|value| PeriodValue {
                period: to_period(key),
                value,
            })
        })
        .collect()
}

/// Values for `site` at `granularity` inside `window`, in chronological order.
///
/// - hour: raw values of the selected day; empty without a day
/// - day: daily means within the selected month, else the selected year
/// - month: monthly means within the selected year, else the latest year
///   present in the index
///
/// Null values never count toward a mean, and a bucket with no values is
/// omitted.
pub fn aggregate(
    index: &TimeSeriesIndex,
    site: &str,
    granularity: Granularity,
    window: &Window,
) -> Vec<PeriodValue> {
    let rows = index.series(site).map(|(ts, v)| (*ts, *v));
    match granularity {
        Granularity::Hour => {
            let Some(day) = window.day else {
                return Vec::new();
            };
            rows.filter(|(ts, _)| ts.date() == day)
                .filter_map(|(ts, v)| {
                    v.map(|value| PeriodValue {
                        period: Period::Hour(ts),
                        value,
                    })
                })
                .collect()
        }
        Granularity::Day => {
            let in_window: Box<dyn Fn(&Timestamp) -> bool> = match (window.month, window.year) {
                (Some(month), _) => Box::new(move |ts| ts.year_month() == month),
                (None, Some(year)) => Box::new(move |ts| ts.year() == year),
                (None, None) => return Vec::new(),
            };
            grouped(
                rows.filter(|(ts, _)| in_window(ts)).map(|(ts, v)| (ts.date(), v)),
                Period::Day,
            )
        }
        Granularity::Month => {
            let Some(year) = window.year.or_else(|| index.latest_year()) else {
                return Vec::new();
            };
            grouped(
                rows.filter(|(ts, _)| ts.year() == year)
                    .map(|(ts, v)| (ts.year_month(), v)),
                Period::Month,
            )
        }
    }
}

/// Aggregated values for the region's city, with the site they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSeries {
    pub site: String,
    pub values: Vec<PeriodValue>,
}

impl RegionSeries {
    pub fn average(&self) -> Option<f64> {
        mean(self.values.iter().map(|v| Some(v.value)))
    }

    pub fn labels(&self) -> Vec<String> {
        self.values.iter().map(|v| v.period.label()).collect()
    }
}

/// Values for the first highlight city of the region's country.
///
/// When that site yields nothing, each matching city's display name is
/// tried as a site name before giving up.
pub fn aggregate_for_region(
    index: &TimeSeriesIndex,
    region: &Region,
    granularity: Granularity,
    window: &Window,
) -> Option<RegionSeries> {
    let cities = cities_for_region(region);
    let primary = cities.first()?;
    let values = aggregate(index, primary.site, granularity, window);
    if !values.is_empty() {
        return Some(RegionSeries {
            site: primary.site.to_string(),
            values,
        });
    }
    for city in &cities {
        let values = aggregate(index, city.name, granularity, window);
        if !values.is_empty() {
            debug!("Using alternate site name {} for {}", city.name, region.name);
            return Some(RegionSeries {
                site: city.name.to_string(),
                values,
            });
        }
    }
    Some(RegionSeries {
        site: primary.site.to_string(),
        values: Vec::new(),
    })
}

/// One highlight city's values for the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct CityReading {
    pub city: &'static HighlightCity,
    pub values: Vec<PeriodValue>,
    pub average: Option<f64>,
}

impl CityReading {
    pub fn new(index: &TimeSeriesIndex, city: &'static HighlightCity, granularity: Granularity, window: &Window) -> Self {
        let values = aggregate(index, city.site, granularity, window);
        let average = mean(values.iter().map(|v| Some(v.value)));
        CityReading {
            city,
            values,
            average,
        }
    }

    /// Value at the slider position. Hours show the raw reading or nothing;
    /// days and months fall back to the period average.
    pub fn current(&self, granularity: Granularity, index: usize) -> Option<f64> {
        let at = self.values.get(index).map(|v| v.value);
        match granularity {
            Granularity::Hour => at,
            _ => at.or(self.average),
        }
    }

    pub fn period(&self, index: usize) -> Option<Period> {
        self.values.get(index).map(|v| v.period)
    }
}
