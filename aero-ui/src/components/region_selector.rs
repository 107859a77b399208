//! Dropdowns for the AOD chart's city and year.

use crate::state::AppState;
use aero_core::catalog::{CHART_YEARS, COUNTRY_OPTIONS};
use dioxus::prelude::*;

/// City dropdown over the chart's country options.
#[component]
pub fn RegionSelector() -> Element {
    let mut state = use_context::<AppState>();
    let selected = (state.country)();

    let on_change = move |evt: Event<FormData>| {
        state.country.set(evt.value());
    };

    rsx! {
        div {
            style: "margin: 8px 0;",
            label {
                r#for: "region-select",
                style: "font-weight: bold; margin-right: 8px;",
                "Region: "
            }
            select {
                id: "region-select",
                onchange: on_change,
                for choice in COUNTRY_OPTIONS.iter() {
                    option {
                        value: "{choice.key}",
                        selected: choice.key == selected,
                        "{choice.label}"
                    }
                }
            }
        }
    }
}

#[component]
pub fn YearSelector() -> Element {
    let mut state = use_context::<AppState>();
    let selected = (state.chart_year)();

    let on_change = move |evt: Event<FormData>| {
        if let Ok(year) = evt.value().parse::<i32>() {
            state.chart_year.set(year);
        }
    };

    rsx! {
        div {
            style: "margin: 8px 0;",
            label {
                r#for: "year-select",
                style: "font-weight: bold; margin-right: 8px;",
                "Year: "
            }
            select {
                id: "year-select",
                onchange: on_change,
                for year in CHART_YEARS {
                    option {
                        value: "{year}",
                        selected: year == selected,
                        "{year}"
                    }
                }
            }
        }
    }
}
