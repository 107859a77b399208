//! Monthly AOD and PM2.5 chart
//!
//! Dual-axis chart for one city and one year: aerosol optical depth on the
//! left axis, PM2.5 on the right, over dry/wet season shading with shared
//! Good/Moderate/Hazardous reference lines.
//!
//! Data flow:
//! 1. The region and year dropdowns pick a country option and a year.
//! 2. The AOD CSV (`PM2.5 - {year}_{slug}.csv`) and the first monthly PM2.5
//!    file that resolves are fetched; a missing file is an empty series.
//! 3. The series mode radios choose which lines are drawn.

use aero_core::catalog::country_option;
use aero_render::chart::{ChartScene, CHART_HEIGHT, CHART_WIDTH};
use aero_ui::components::{
    ChartContainer, ChartHeader, ErrorDisplay, RegionSelector, SeriesModeToggle, YearSelector,
};
use aero_ui::loader;
use aero_ui::state::AppState;
use dioxus::prelude::*;

/// DOM id of the chart container.
const CHART_ID: &str = "aod-chart";

fn main() {
    dioxus_logger::init(dioxus_logger::tracing::Level::INFO).expect("failed to init logger");
    dioxus::LaunchBuilder::new()
        .with_cfg(dioxus::web::Config::new().rootname("chart-aod-root"))
        .launch(App);
}

#[component]
fn App() -> Element {
    let mut state = use_context_provider(AppState::new);
    // Latest request; older responses are ignored.
    let mut request = use_signal(|| 0u64);

    // ─── Effect 1: reload both series when region or year changes ───
    use_effect(move || {
        let key = (state.country)();
        let year = (state.chart_year)();
        let Some(option) = country_option(&key) else {
            state.error_msg.set(Some(format!("Unknown region {}", key)));
            return;
        };
        let id = *request.peek() + 1;
        request.set(id);
        state.loading.set(true);
        state.error_msg.set(None);

        spawn(async move {
            let aod = loader::load_aod(option, year).await;
            let pm25 = loader::load_monthly_pm(option, year).await;
            if *request.peek() != id {
                log::debug!("Dropping stale chart data for {} {}", option.key, year);
                return;
            }
            if !aod.has_data() && !pm25.has_data() {
                log::warn!("No chart data for {} {}", option.label, year);
            }
            state.aod.set(aod);
            state.pm25.set(pm25);
            state.loading.set(false);
        });
    });

    let svg = use_memo(move || {
        ChartScene::build(
            &state.aod.read(),
            &state.pm25.read(),
            (state.series_mode)(),
            CHART_WIDTH,
            CHART_HEIGHT,
        )
        .map(|scene| scene.to_svg())
    });

    let title = country_option(&(state.country)())
        .map(|o| format!("{} - {}", o.label, (state.chart_year)()))
        .unwrap_or_default();

    rsx! {
        div {
            style: "padding: 16px; max-width: 420px; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;",

            ChartHeader {
                title: title,
                subtitle: "AOD (left axis) and PM2.5 in µg/m³ (right axis)".to_string(),
            }

            div {
                style: "display: flex; flex-wrap: wrap; gap: 12px; align-items: flex-end;",
                RegionSelector {}
                YearSelector {}
            }
            SeriesModeToggle {}

            if let Some(err) = (state.error_msg)() {
                ErrorDisplay { message: err }
            }

            ChartContainer {
                id: CHART_ID.to_string(),
                svg: svg(),
                loading: (state.loading)(),
                min_height: CHART_HEIGHT as u32,
            }
        }
    }
}
