//! Daily PM2.5 time-lapse
//!
//! Plays through the daily readings of Ho Chi Minh City one date per
//! second, drawing a circle sized and colored by the day's PM2.5 and AQI
//! category over the country outline. A side chart shows the site's
//! readings in the current seasonal window with unhealthy days in red.
//!
//! Data flow:
//! 1. `build.rs` bundles `fixtures/geo/*.json`; Vietnam's outline is
//!    resolved from there, falling back to the remote boundary files.
//! 2. On mount, the site's daily combined CSV is fetched and autoplay starts.
//! 3. Dragging the slider or pressing pause stops playback.

use aero_core::catalog::DAILY_CSV_FILES;
use aero_core::region::RegionCollection;
use aero_render::timelapse::{
    season_color, PeriodChart, TimelapseScene, PERIOD_CHART_HEIGHT, PERIOD_CHART_WIDTH, TIMELAPSE_HEIGHT,
    TIMELAPSE_WIDTH,
};
use aero_render::transition::{play, Autoplay};
use aero_ui::components::{ChartContainer, ChartHeader, ErrorDisplay, LoadingSpinner};
use aero_ui::js_bridge::BrowserClock;
use aero_ui::loader::{self, Bundle};
use aero_ui::state::AppState;
use chrono::NaiveDate;
use dioxus::prelude::*;

/// Boundary files compiled into the binary.
const BUNDLED_GEO: Bundle = include!(concat!(env!("OUT_DIR"), "/bundled_geo.rs"));

const SITE: &str = "Ho Chi Minh City";
const COUNTRY: &str = "Vietnam";

fn main() {
    dioxus_logger::init(dioxus_logger::tracing::Level::INFO).expect("failed to init logger");
    dioxus::LaunchBuilder::new()
        .with_cfg(dioxus::web::Config::new().rootname("map-timelapse-root"))
        .launch(App);
}

/// Advance autoplay every animation frame until it stops or a newer
/// playback loop starts.
fn start_playback(mut state: AppState, mut playback_gen: Signal<u64>) {
    let gen = *playback_gen.peek() + 1;
    playback_gen.set(gen);
    spawn(async move {
        let mut clock = BrowserClock;
        let frames = play(&mut clock, move |now| {
            if *playback_gen.peek() != gen {
                log::debug!("Playback loop {} superseded", gen);
                return None;
            }
            state.autoplay.write().tick(now)
        })
        .await;
        log::debug!("Playback loop {} ended after {} frames", gen, frames);
    });
}

#[component]
fn App() -> Element {
    let mut state = use_context_provider(AppState::new);
    // Bumped per playback loop; only the newest loop advances autoplay.
    let playback_gen = use_signal(|| 0u64);

    // ─── Effect 1: outline and daily rows on mount, then autoplay ───
    use_effect(move || {
        spawn(async move {
            let base = loader::load_base_map(BUNDLED_GEO);
            let country = base.position_by_name(COUNTRY).and_then(|i| base.get(i)).cloned();
            let outline = match country {
                Some(region) => loader::load_region_detail(&region, BUNDLED_GEO)
                    .await
                    .unwrap_or_else(|| RegionCollection {
                        regions: vec![region],
                    }),
                None => base,
            };
            state.detail.set(Some(outline));

            let mut daily = loader::load_daily(DAILY_CSV_FILES[0]).await;
            daily.retain_sites(&[SITE]);
            if daily.is_empty() {
                state
                    .error_msg
                    .set(Some(format!("No daily readings for {}", SITE)));
            }
            state.autoplay.set(Autoplay::new(daily.dates().len(), 0));
            state.daily.set(daily);
            state.loading.set(false);
            start_playback(state, playback_gen);
        });
    });

    let current_date = use_memo(move || {
        let index = state.autoplay.read().index();
        state.daily.read().dates().get(index).copied()
    });

    let views = use_memo(move || {
        let date: NaiveDate = current_date()?;
        let daily = state.daily.read();
        let detail = state.detail.read();
        let empty = RegionCollection::default();
        let outline = detail.as_ref().unwrap_or(&empty);
        let scene = TimelapseScene::build(outline, &daily, SITE, date, TIMELAPSE_WIDTH, TIMELAPSE_HEIGHT);
        let chart = PeriodChart::build(&daily, SITE, date, PERIOD_CHART_WIDTH, PERIOD_CHART_HEIGHT);
        Some((scene, chart.map(|c| c.to_svg())))
    });

    let playing = state.autoplay.read().is_playing();
    let len = state.daily.read().dates().len();
    let position = state.autoplay.read().index();
    let max = len.saturating_sub(1);

    let on_toggle = move |_: Event<MouseData>| {
        if state.autoplay.peek().is_playing() {
            state.autoplay.write().stop();
        } else {
            let index = state.autoplay.peek().index();
            state.autoplay.set(Autoplay::new(len, index));
            start_playback(state, playback_gen);
        }
    };
    let on_seek = move |evt: Event<FormData>| {
        if let Ok(position) = evt.value().parse::<f64>() {
            state.autoplay.write().seek(position);
        }
    };

    let (map_svg, chart_svg, title, date_label, date_color) = match views() {
        Some((scene, chart)) => (
            Some(scene.to_svg()),
            chart,
            scene.title.clone(),
            scene.date_label.clone(),
            season_color(scene.season),
        ),
        None => (None, None, SITE.to_string(), String::new(), "#333"),
    };

    rsx! {
        div {
            style: "padding: 16px; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;",

            ChartHeader {
                title: title,
                subtitle: "Daily average PM2.5 colored by AQI category".to_string(),
            }

            if let Some(err) = (state.error_msg)() {
                ErrorDisplay { message: err }
            }

            if (state.loading)() {
                LoadingSpinner {}
            } else {
                div {
                    style: "margin: 8px 0; display: flex; gap: 8px; align-items: center;",
                    button {
                        onclick: on_toggle,
                        style: "min-width: 64px;",
                        if playing { "Pause" } else { "Play" }
                    }
                    input {
                        r#type: "range",
                        min: "0",
                        max: "{max}",
                        value: "{position}",
                        style: "flex: 1;",
                        oninput: on_seek,
                    }
                    span {
                        style: "font-weight: 700; color: {date_color}; min-width: 80px;",
                        "{date_label}"
                    }
                }
                div {
                    style: "display: flex; flex-wrap: wrap; gap: 16px; align-items: flex-start;",
                    div {
                        style: "flex: 1; min-width: 320px;",
                        ChartContainer {
                            id: "timelapse-map".to_string(),
                            svg: map_svg,
                            min_height: 300,
                            empty_message: "No readings".to_string(),
                        }
                    }
                    div {
                        style: "width: {PERIOD_CHART_WIDTH}px;",
                        ChartContainer {
                            id: "timelapse-period".to_string(),
                            svg: chart_svg,
                            min_height: PERIOD_CHART_HEIGHT as u32,
                            empty_message: "No readings in this period".to_string(),
                        }
                    }
                }
            }
        }
    }
}
