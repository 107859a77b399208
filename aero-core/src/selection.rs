use crate::timestamp::YearMonth;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Time resolution of the values shown for a selected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Granularity {
    #[default]
    Hour,
    Day,
    Month,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Month => "month",
        };
        write!(f, "{}", s)
    }
}

/// Map display state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    Overview,
    Drilled(usize),
}

/// Outcome of a region click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionChange {
    Selected(usize),
    Cleared,
}

/// Identifies the selection a detail load was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Date filters applied to aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    pub year: Option<i32>,
    pub month: Option<YearMonth>,
    pub day: Option<NaiveDate>,
}

/// What the user has picked on the map and its controls.
///
/// Date choices cascade: picking a year clears month and day and shows
/// months; picking a month clears day and shows days; picking a day shows
/// hours. Any region change resets dates, granularity and slider positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    region: Option<usize>,
    window: Window,
    granularity: Granularity,
    period_index: usize,
    hour_index: usize,
    time_index: usize,
    generation: u64,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::new()
    }
}

impl Selection {
    pub fn new() -> Selection {
        Selection {
            region: None,
            window: Window::default(),
            granularity: Granularity::Hour,
            period_index: 0,
            hour_index: 0,
            time_index: 0,
            generation: 0,
        }
    }

    pub fn mode(&self) -> MapMode {
        match self.region {
            Some(index) => MapMode::Drilled(index),
            None => MapMode::Overview,
        }
    }

    pub fn region(&self) -> Option<usize> {
        self.region
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn year(&self) -> Option<i32> {
        self.window.year
    }

    pub fn month(&self) -> Option<YearMonth> {
        self.window.month
    }

    pub fn day(&self) -> Option<NaiveDate> {
        self.window.day
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn period_index(&self) -> usize {
        self.period_index
    }

    pub fn hour_index(&self) -> usize {
        self.hour_index
    }

    pub fn time_index(&self) -> usize {
        self.time_index
    }

    /// Slider position for the active granularity.
    pub fn active_index(&self) -> usize {
        match self.granularity {
            Granularity::Hour => self.hour_index,
            _ => self.period_index,
        }
    }

    fn reset_dates(&mut self) {
        self.window = Window::default();
        self.granularity = Granularity::Hour;
        self.period_index = 0;
        self.hour_index = 0;
        self.generation += 1;
    }

    /// Click on a region or its capital marker: selects it, or clears when
    /// it is already selected.
    pub fn toggle_region(&mut self, index: usize) -> RegionChange {
        if self.region == Some(index) {
            return self.clear_region();
        }
        self.reset_dates();
        self.region = Some(index);
        RegionChange::Selected(index)
    }

    /// Background click or programmatic clear.
    pub fn clear_region(&mut self) -> RegionChange {
        self.reset_dates();
        self.region = None;
        RegionChange::Cleared
    }

    /// Picking a year shows its months; clearing it falls back to hours.
    pub fn select_year(&mut self, year: Option<i32>) {
        self.window = Window {
            year,
            month: None,
            day: None,
        };
        self.granularity = if year.is_some() {
            Granularity::Month
        } else {
            Granularity::Hour
        };
        self.period_index = 0;
        self.hour_index = 0;
    }

    /// Picking a month shows its days; clearing it returns to months.
    pub fn select_month(&mut self, month: Option<YearMonth>) {
        match month {
            Some(ym) => {
                self.window = Window {
                    year: Some(ym.year),
                    month: Some(ym),
                    day: None,
                };
                self.granularity = Granularity::Day;
            }
            None => {
                self.window.month = None;
                self.window.day = None;
                self.granularity = if self.window.year.is_some() {
                    Granularity::Month
                } else {
                    Granularity::Hour
                };
            }
        }
        self.period_index = 0;
        self.hour_index = 0;
    }

    /// Picking a day shows its hours; clearing it returns to days.
    pub fn select_day(&mut self, day: Option<NaiveDate>) {
        match day {
            Some(date) => {
                self.window = Window {
                    year: Some(date.year()),
                    month: YearMonth::new(date.year(), date.month()),
                    day: Some(date),
                };
                self.granularity = Granularity::Hour;
            }
            None => {
                self.window.day = None;
                self.granularity = if self.window.month.is_some() {
                    Granularity::Day
                } else if self.window.year.is_some() {
                    Granularity::Month
                } else {
                    Granularity::Hour
                };
            }
        }
        self.period_index = 0;
        self.hour_index = 0;
    }

    /// Move the period slider, clamped to `len` values.
    pub fn set_period_index(&mut self, index: usize, len: usize) {
        self.period_index = clamp_index(index, len);
    }

    /// Move the hour slider, clamped to `len` values.
    pub fn set_hour_index(&mut self, index: usize, len: usize) {
        self.hour_index = clamp_index(index, len);
    }

    /// Move the slider of the active granularity.
    pub fn set_active_index(&mut self, index: usize, len: usize) {
        match self.granularity {
            Granularity::Hour => self.set_hour_index(index, len),
            _ => self.set_period_index(index, len),
        }
    }

    /// Move the overview time slider, clamped to `len` timestamps.
    pub fn set_time_index(&mut self, index: usize, len: usize) {
        self.time_index = clamp_index(index, len);
    }

    /// Token for a detail load started now.
    pub fn request_token(&self) -> RequestToken {
        RequestToken(self.generation)
    }

    /// Whether a load started with `token` still matches the selection.
    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.generation
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_year_then_month_cascade() {
        let mut sel = Selection::new();
        sel.toggle_region(0);
        sel.select_day(NaiveDate::from_ymd_opt(2020, 5, 2));
        sel.select_year(Some(2021));
        assert_eq!(sel.granularity(), Granularity::Month);
        assert_eq!(sel.month(), None);
        assert_eq!(sel.day(), None);

        sel.select_month(Some(ym(2021, 3)));
        assert_eq!(sel.granularity(), Granularity::Day);
        assert_eq!(sel.day(), None);

        let day = NaiveDate::from_ymd_opt(2021, 3, 15).unwrap();
        sel.select_day(Some(day));
        assert_eq!(sel.granularity(), Granularity::Hour);
        assert_eq!(sel.day(), Some(day));
        assert_eq!(sel.month(), Some(ym(2021, 3)));
    }

    #[test]
    fn test_clearing_levels_falls_back_to_parent() {
        let mut sel = Selection::new();
        sel.select_day(NaiveDate::from_ymd_opt(2021, 3, 15));
        assert_eq!(sel.year(), Some(2021));
        sel.select_day(None);
        assert_eq!(sel.granularity(), Granularity::Day);
        sel.select_month(None);
        assert_eq!(sel.granularity(), Granularity::Month);
        sel.select_year(None);
        assert_eq!(sel.granularity(), Granularity::Hour);
        assert_eq!(sel.window(), Window::default());
    }

    #[test]
    fn test_toggle_region() {
        let mut sel = Selection::new();
        assert_eq!(sel.mode(), MapMode::Overview);
        assert_eq!(sel.toggle_region(2), RegionChange::Selected(2));
        assert_eq!(sel.mode(), MapMode::Drilled(2));
        sel.select_year(Some(2021));
        sel.set_period_index(5, 12);

        // switching regions resets dates
        assert_eq!(sel.toggle_region(3), RegionChange::Selected(3));
        assert_eq!(sel.year(), None);
        assert_eq!(sel.granularity(), Granularity::Hour);
        assert_eq!(sel.period_index(), 0);

        // clicking the selected region again clears
        assert_eq!(sel.toggle_region(3), RegionChange::Cleared);
        assert_eq!(sel.mode(), MapMode::Overview);
    }

    #[test]
    fn test_stale_tokens() {
        let mut sel = Selection::new();
        sel.toggle_region(1);
        let first = sel.request_token();
        assert!(sel.is_current(first));
        sel.toggle_region(2);
        let second = sel.request_token();
        assert!(!sel.is_current(first));
        assert!(sel.is_current(second));
        sel.clear_region();
        assert!(!sel.is_current(second));
    }

    #[test]
    fn test_index_clamping() {
        let mut sel = Selection::new();
        sel.set_period_index(20, 12);
        assert_eq!(sel.period_index(), 11);
        sel.set_hour_index(3, 0);
        assert_eq!(sel.hour_index(), 0);
        sel.set_time_index(99, 10);
        assert_eq!(sel.time_index(), 9);
        sel.set_active_index(4, 24);
        assert_eq!(sel.active_index(), 4);
        assert_eq!(sel.hour_index(), 4);
    }
}
