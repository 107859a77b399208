//! Sliders over the aggregated periods of the selected region and over the
//! overview timestamps.

use crate::state::AppState;
use aero_data::aggregate::aggregate_for_region;
use dioxus::prelude::*;

/// Steps through the periods of the active granularity for the selected
/// region's city. Hidden in overview or when there is nothing to step.
#[component]
pub fn PeriodSlider() -> Element {
    let mut state = use_context::<AppState>();
    let selection = state.selection.read().clone();
    let series = {
        let index = state.index.read();
        let base = state.base.read();
        selection
            .region()
            .and_then(|i| base.get(i))
            .and_then(|region| aggregate_for_region(&index, region, selection.granularity(), &selection.window()))
    };
    let Some(series) = series.filter(|s| !s.values.is_empty()) else {
        return rsx! {};
    };
    let len = series.values.len();
    let current = selection.active_index().min(len - 1);
    let label = series.values[current].period.label();
    let max = len - 1;
    let granularity = selection.granularity().to_string();
    let site = series.site.clone();

    let on_input = move |evt: Event<FormData>| {
        if let Ok(i) = evt.value().parse::<usize>() {
            state.selection.write().set_active_index(i, len);
        }
    };

    rsx! {
        div {
            style: "margin: 8px 0; display: flex; gap: 8px; align-items: center;",
            span { style: "font-weight: bold;", "{granularity}: " }
            input {
                r#type: "range",
                min: "0",
                max: "{max}",
                value: "{current}",
                oninput: on_input,
            }
            span { style: "font-size: 12px; color: #333;", "{label} ({site})" }
        }
    }
}

/// Scrubs every timestamp in the index; drives the overview choropleth.
#[component]
pub fn TimeSlider() -> Element {
    let mut state = use_context::<AppState>();
    let len = state.index.read().timestamps().len();
    if len == 0 {
        return rsx! {};
    }
    let current = state.selection.read().time_index().min(len - 1);
    let label = state.index.read().timestamps()[current].date().format("%Y-%m-%d").to_string();
    let max = len - 1;

    let on_input = move |evt: Event<FormData>| {
        if let Ok(i) = evt.value().parse::<usize>() {
            state.selection.write().set_time_index(i, len);
        }
    };

    rsx! {
        div {
            style: "margin: 8px 0; display: flex; gap: 8px; align-items: center;",
            span { style: "font-weight: bold;", "Time: " }
            input {
                r#type: "range",
                min: "0",
                max: "{max}",
                value: "{current}",
                style: "flex: 1;",
                oninput: on_input,
            }
            span { style: "font-size: 12px; color: #333; min-width: 80px;", "{label}" }
        }
    }
}
