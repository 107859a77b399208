//! Reusable Dioxus RSX components for the Aero-Cast apps.

mod chart_container;
mod chart_header;
mod date_selectors;
mod error_display;
mod loading_spinner;
mod map_canvas;
mod period_slider;
mod region_selector;
mod series_mode_toggle;

pub use chart_container::ChartContainer;
pub use chart_header::ChartHeader;
pub use date_selectors::DateSelectors;
pub use error_display::ErrorDisplay;
pub use loading_spinner::LoadingSpinner;
pub use map_canvas::MapCanvas;
pub use period_slider::{PeriodSlider, TimeSlider};
pub use region_selector::{RegionSelector, YearSelector};
pub use series_mode_toggle::SeriesModeToggle;
