//! Year, month and day dropdowns for the selected region.

use crate::state::AppState;
use aero_core::timestamp::YearMonth;
use chrono::NaiveDate;
use dioxus::prelude::*;

/// Cascading date dropdowns. Each level only lists values present in the
/// index under its parent, and is hidden until the parent is chosen.
#[component]
pub fn DateSelectors() -> Element {
    let mut state = use_context::<AppState>();
    let parts = state.index.read().date_parts();
    let selection = state.selection.read().clone();

    let months = selection.year().map(|y| parts.months_in_year(y)).unwrap_or_default();
    let days = selection.month().map(|m| parts.days_in_month(m)).unwrap_or_default();
    let year_value = selection.year().map(|y| y.to_string()).unwrap_or_default();
    let month_value = selection.month().map(|m| m.to_string()).unwrap_or_default();
    let day_value = selection.day().map(|d| d.to_string()).unwrap_or_default();

    let on_year = move |evt: Event<FormData>| {
        let year = evt.value().parse::<i32>().ok();
        state.selection.write().select_year(year);
    };
    let on_month = move |evt: Event<FormData>| {
        let month = evt.value().parse::<YearMonth>().ok();
        state.selection.write().select_month(month);
    };
    let on_day = move |evt: Event<FormData>| {
        let day = evt.value().parse::<NaiveDate>().ok();
        state.selection.write().select_day(day);
    };

    rsx! {
        div {
            style: "margin: 8px 0; display: flex; gap: 12px; align-items: center; flex-wrap: wrap;",
            label {
                style: "font-weight: bold;",
                "Year: "
                select {
                    onchange: on_year,
                    option { value: "", selected: year_value.is_empty(), "All" }
                    for year in parts.years.iter() {
                        option {
                            value: "{year}",
                            selected: year.to_string() == year_value,
                            "{year}"
                        }
                    }
                }
            }
            if !months.is_empty() {
                label {
                    style: "font-weight: bold;",
                    "Month: "
                    select {
                        onchange: on_month,
                        option { value: "", selected: month_value.is_empty(), "All" }
                        for month in months.iter() {
                            option {
                                value: "{month}",
                                selected: month.to_string() == month_value,
                                "{month}"
                            }
                        }
                    }
                }
            }
            if !days.is_empty() {
                label {
                    style: "font-weight: bold;",
                    "Day: "
                    select {
                        onchange: on_day,
                        option { value: "", selected: day_value.is_empty(), "All" }
                        for day in days.iter() {
                            option {
                                value: "{day}",
                                selected: day.to_string() == day_value,
                                "{day}"
                            }
                        }
                    }
                }
            }
        }
    }
}
