//! Application state managed via Dioxus context.
//!
//! `AppState` bundles all reactive signals into a single struct provided via
//! `use_context_provider`. Child components retrieve it with `use_context::<AppState>()`.
//! Each app only touches the signals it needs.

use aero_core::index::TimeSeriesIndex;
use aero_core::region::RegionCollection;
use aero_core::selection::Selection;
use aero_data::daily::DailyTable;
use aero_data::series::{MonthlySeries, SeriesMode};
use aero_render::projection::Mercator;
use aero_render::transition::Autoplay;
use dioxus::prelude::*;

/// Default region of the AOD chart.
pub const DEFAULT_COUNTRY_OPTION: &str = "Vietnam-HCM";
/// Default year of the AOD chart.
pub const DEFAULT_CHART_YEAR: i32 = 2024;

/// Shared application state for all Aero-Cast apps.
#[derive(Clone, Copy)]
pub struct AppState {
    /// Whether the app is still loading
    pub loading: Signal<bool>,
    /// Error message if something went wrong
    pub error_msg: Signal<Option<String>>,

    /// Observations merged from the daily CSVs
    pub index: Signal<TimeSeriesIndex>,
    /// Top-level regions of the base map
    pub base: Signal<RegionCollection>,
    /// Detail geometry of the selected region
    pub detail: Signal<Option<RegionCollection>>,
    /// Provinces of the selected region
    pub provinces: Signal<Option<RegionCollection>>,
    pub selection: Signal<Selection>,
    /// Projection currently drawn; moves toward the target during transitions
    pub projection: Signal<Mercator>,

    /// Key of the selected [`aero_core::catalog::CountryOption`]
    pub country: Signal<String>,
    pub chart_year: Signal<i32>,
    pub series_mode: Signal<SeriesMode>,
    pub aod: Signal<MonthlySeries>,
    pub pm25: Signal<MonthlySeries>,

    /// Daily rows of the time-lapse site
    pub daily: Signal<DailyTable>,
    pub autoplay: Signal<Autoplay>,
}

impl AppState {
    /// Create a new AppState with default signal values.
    pub fn new() -> Self {
        Self {
            loading: Signal::new(true),
            error_msg: Signal::new(None),
            index: Signal::new(TimeSeriesIndex::default()),
            base: Signal::new(RegionCollection::default()),
            detail: Signal::new(None),
            provinces: Signal::new(None),
            selection: Signal::new(Selection::new()),
            projection: Signal::new(Mercator::default()),
            country: Signal::new(DEFAULT_COUNTRY_OPTION.to_string()),
            chart_year: Signal::new(DEFAULT_CHART_YEAR),
            series_mode: Signal::new(SeriesMode::default()),
            aod: Signal::new(MonthlySeries::default()),
            pm25: Signal::new(MonthlySeries::default()),
            daily: Signal::new(DailyTable::default()),
            autoplay: Signal::new(Autoplay::new(0, 0)),
        }
    }
}
