//! Southeast Asia air-quality map
//!
//! Overview of the region's countries with a choropleth driven by the time
//! slider. Clicking a country drills in: the map eases to the country's
//! detail geometry, provinces are drawn, and each monitored city shows a
//! hexagon colored by its PM2.5 value for the selected period.
//!
//! Data flow:
//! 1. `build.rs` bundles `fixtures/geo/*.json`; the base map comes from there.
//! 2. On mount, the daily combined CSVs are fetched concurrently and merged
//!    into one index in a fixed priority order.
//! 3. A region change starts detail and province loads tagged with the
//!    selection's request token; results for a stale token are dropped.
//! 4. Every change of target projection runs a 600 ms eased transition
//!    driven by `requestAnimationFrame`.

use aero_render::map::{MapLayers, MapScene, MAP_HEIGHT, MAP_WIDTH};
use aero_render::projection::Mercator;
use aero_render::transition::{animate, Transition};
use aero_ui::components::{
    ChartHeader, DateSelectors, ErrorDisplay, LoadingSpinner, MapCanvas, PeriodSlider, TimeSlider,
};
use aero_ui::js_bridge::BrowserClock;
use aero_ui::loader::{self, Bundle};
use aero_ui::state::AppState;
use dioxus::prelude::*;

/// Boundary files compiled into the binary.
const BUNDLED_GEO: Bundle = include!(concat!(env!("OUT_DIR"), "/bundled_geo.rs"));

fn main() {
    dioxus_logger::init(dioxus_logger::tracing::Level::INFO).expect("failed to init logger");
    dioxus::LaunchBuilder::new()
        .with_cfg(dioxus::web::Config::new().rootname("map-explorer-root"))
        .launch(App);
}

#[component]
fn App() -> Element {
    let mut state = use_context_provider(AppState::new);
    // Bumped per transition; a running transition stops once it is outdated.
    let mut transition_gen = use_signal(|| 0u64);

    // ─── Effect 1: base map and observation index on mount ───
    use_effect(move || {
        let base = loader::load_base_map(BUNDLED_GEO);
        if base.is_empty() {
            state.error_msg.set(Some("The base map could not be loaded.".to_string()));
        }
        state
            .projection
            .set(Mercator::fit_view(MAP_WIDTH, MAP_HEIGHT, base.bounding_rect()));
        state.base.set(base);

        spawn(async move {
            let index = loader::load_index().await;
            if index.is_empty() {
                state
                    .error_msg
                    .set(Some("No air-quality data could be loaded.".to_string()));
            }
            let len = index.timestamps().len();
            state.selection.write().set_time_index(len.saturating_sub(1), len);
            state.index.set(index);
            state.loading.set(false);
        });
    });

    // ─── Effect 2: detail and province layers for the selected region ───
    let selected_region = use_memo(move || state.selection.read().region());
    use_effect(move || {
        let selected = selected_region();
        state.detail.set(None);
        state.provinces.set(None);
        let Some(region) = selected.and_then(|i| state.base.peek().get(i).cloned()) else {
            return;
        };
        let token = state.selection.peek().request_token();
        spawn(async move {
            let detail = loader::load_region_detail(&region, BUNDLED_GEO).await;
            if !state.selection.peek().is_current(token) {
                log::debug!("Dropping stale detail for {}", region.name);
                return;
            }
            state.detail.set(detail);

            let provinces = loader::load_provinces(&region, BUNDLED_GEO).await;
            if !state.selection.peek().is_current(token) {
                log::debug!("Dropping stale provinces for {}", region.name);
                return;
            }
            state.provinces.set(provinces);
        });
    });

    // ─── Effect 3: ease the projection toward its target ───
    let target = use_memo(move || {
        let base = state.base.read();
        let detail = state.detail.read();
        let layers = MapLayers {
            base: &base,
            detail: detail.as_ref(),
            provinces: None,
        };
        layers.target_projection(&state.selection.read(), MAP_WIDTH, MAP_HEIGHT)
    });
    use_effect(move || {
        let to = target();
        let from = *state.projection.peek();
        let gen = *transition_gen.peek() + 1;
        transition_gen.set(gen);
        spawn(async move {
            let mut clock = BrowserClock;
            let done = animate(Transition::between(from, to), &mut clock, move |m| {
                if *transition_gen.peek() != gen {
                    return false;
                }
                state.projection.set(m);
                true
            })
            .await;
            if done.is_none() {
                log::debug!("Transition {} superseded", gen);
            }
        });
    });

    let scene = use_memo(move || {
        let base = state.base.read();
        let detail = state.detail.read();
        let provinces = state.provinces.read();
        let layers = MapLayers {
            base: &base,
            detail: detail.as_ref(),
            provinces: provinces.as_ref(),
        };
        MapScene::build(
            &layers,
            &state.index.read(),
            &state.selection.read(),
            &state.projection.read(),
            MAP_WIDTH,
            MAP_HEIGHT,
        )
    });

    let drilled = state.selection.read().region().is_some();
    let subtitle = match scene.read().title.as_ref() {
        Some(title) => format!("{} - click the country again or the background to go back", title.name),
        None => "Click a country to see its cities".to_string(),
    };

    rsx! {
        div {
            style: "padding: 16px; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;",

            ChartHeader {
                title: "Southeast Asia Air Quality (PM2.5)".to_string(),
                subtitle: subtitle,
            }

            if let Some(err) = (state.error_msg)() {
                ErrorDisplay { message: err }
            }

            if (state.loading)() {
                LoadingSpinner {}
            } else if drilled {
                div {
                    style: "display: flex; flex-wrap: wrap; gap: 12px; align-items: flex-end;",
                    DateSelectors {}
                    PeriodSlider {}
                }
            } else {
                TimeSlider {}
            }

            MapCanvas {
                scene: scene(),
                on_region: move |index: usize| {
                    let change = state.selection.write().toggle_region(index);
                    log::info!("Region change: {:?}", change);
                },
                on_background: move |_| {
                    if state.selection.peek().region().is_some() {
                        state.selection.write().clear_region();
                    }
                },
            }

            MarkerLegend {}
        }
    }
}

/// Legend for the city hexagon colors.
#[component]
fn MarkerLegend() -> Element {
    use aero_render::marker::MarkerCategory;
    let entries = [
        (MarkerCategory::Good, "Good (0-35)"),
        (MarkerCategory::Moderate, "Moderate (35-55)"),
        (MarkerCategory::Hazardous, "Hazardous (55+)"),
        (MarkerCategory::Missing, "No data"),
    ]
    .map(|(category, label)| {
        let swatch = format!(
            "display: inline-block; width: 12px; height: 12px; border-radius: 2px; background: {}; border: 1px solid {};",
            category.fill(),
            category.stroke()
        );
        (swatch, label)
    });

    rsx! {
        div {
            style: "margin-top: 12px; padding: 8px 12px; background: #FAFAFA; border-radius: 4px; border: 1px solid #E0E0E0; font-size: 12px; display: flex; gap: 16px; flex-wrap: wrap;",
            for (swatch, label) in entries {
                div {
                    style: "display: flex; align-items: center; gap: 4px;",
                    span { style: "{swatch}" }
                    "{label}"
                }
            }
        }
    }
}
