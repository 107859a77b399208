//! Radio group choosing which chart lines are drawn.

use crate::state::AppState;
use aero_data::series::SeriesMode;
use dioxus::prelude::*;

const MODES: [(SeriesMode, &str); 3] = [
    (SeriesMode::Aod, "AOD"),
    (SeriesMode::Pm25, "PM2.5"),
    (SeriesMode::Both, "Both"),
];

#[component]
pub fn SeriesModeToggle() -> Element {
    let mut state = use_context::<AppState>();
    let current = (state.series_mode)();

    rsx! {
        div {
            style: "margin: 8px 0; display: flex; gap: 12px; align-items: center;",
            for (mode, label) in MODES {
                label {
                    style: "display: flex; gap: 4px; align-items: center; cursor: pointer;",
                    input {
                        r#type: "radio",
                        name: "series-mode",
                        value: mode.as_str(),
                        checked: mode == current,
                        onchange: move |_| state.series_mode.set(mode),
                    }
                    "{label}"
                }
            }
        }
    }
}
