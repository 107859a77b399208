//! Interactive SVG view of a [`MapScene`].

use aero_render::map::{CapitalMarker, CityMarker, MapScene};
use aero_render::svg::num;
use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct MapCanvasProps {
    pub scene: MapScene,
    /// Click on a country or its capital marker
    pub on_region: EventHandler<usize>,
    /// Click on empty map area
    pub on_background: EventHandler<()>,
}

#[component]
pub fn MapCanvas(props: MapCanvasProps) -> Element {
    let scene = &props.scene;
    let view_box = format!("0 0 {} {}", num(scene.width), num(scene.height));
    let on_region = props.on_region;
    let on_background = props.on_background;
    let base_opacity = if scene.base_visible { "1" } else { "0" };
    let base_events = if scene.base_visible { "auto" } else { "none" };
    let svg_style = format!(
        "max-width: {}px; background: #f4fbf7; border-radius: 6px;",
        num(scene.width)
    );

    rsx! {
        svg {
            view_box: "{view_box}",
            width: "100%",
            style: "{svg_style}",
            rect {
                x: "0",
                y: "0",
                width: num(scene.width),
                height: num(scene.height),
                fill: "transparent",
                onclick: move |_| on_background.call(()),
            }
            if scene.base_visible {
                if let Some(date) = scene.date_label.clone() {
                    text {
                        x: num(scene.width - 12.0),
                        y: "28",
                        text_anchor: "end",
                        font_size: "18",
                        font_weight: "700",
                        fill: "#0b6630",
                        "{date}"
                    }
                }
            }
            g {
                class: "base-layer",
                opacity: base_opacity,
                pointer_events: base_events,
                path {
                    d: "{scene.graticule}",
                    fill: "none",
                    stroke: "#bfe6cf",
                    stroke_width: "0.6",
                    opacity: "0.9",
                    pointer_events: "none",
                }
                for shape in scene.regions.iter() {
                    path {
                        key: "{shape.index}",
                        d: "{shape.d}",
                        fill: "{shape.fill}",
                        stroke: shape.stroke,
                        stroke_width: num(shape.stroke_width),
                        style: "cursor: pointer;",
                        onclick: {
                            let index = shape.index;
                            move |evt: Event<MouseData>| {
                                evt.stop_propagation();
                                on_region.call(index);
                            }
                        },
                    }
                }
                for cap in scene.capitals.iter() {
                    Capital { key: "{cap.region_index}", marker: cap.clone(), on_click: on_region }
                }
            }
            if !scene.detail.is_empty() {
                g {
                    class: "country-detail-layer",
                    pointer_events: "none",
                    for d in scene.detail.iter() {
                        path { d: "{d}", fill: "rgba(255,255,255,0.02)", stroke: "#0b6630", stroke_width: "1" }
                    }
                }
            }
            if !scene.provinces.is_empty() {
                g {
                    class: "provinces-layer",
                    pointer_events: "none",
                    for d in scene.provinces.iter() {
                        path { d: "{d}", fill: "#fff8e6", stroke: "#d6b74a", stroke_width: "0.6", opacity: "0.95" }
                    }
                }
            }
            if let Some(title) = scene.title.clone() {
                text {
                    x: num(title.at.x),
                    y: num(title.at.y),
                    text_anchor: "middle",
                    font_size: "18",
                    font_weight: "700",
                    fill: "#0b6630",
                    stroke: "#ffffff",
                    stroke_width: "4",
                    style: "paint-order: stroke;",
                    pointer_events: "none",
                    "{title.name}"
                }
            }
            for city in scene.cities.iter() {
                City { key: "{city.name}", marker: city.clone() }
            }
        }
    }
}

#[derive(Props, Clone, PartialEq)]
struct CapitalProps {
    marker: CapitalMarker,
    on_click: EventHandler<usize>,
}

/// Pin with a round flag badge.
#[component]
fn Capital(props: CapitalProps) -> Element {
    let m = &props.marker;
    let (b, t) = (m.badge(), m.tip);
    let index = m.region_index;
    let on_click = props.on_click;
    let arrow = format!(
        "{},{} {},{} {},{}",
        num(t.x - 4.0),
        num(t.y - 3.0),
        num(t.x + 4.0),
        num(t.y - 3.0),
        num(t.x),
        num(t.y + 4.0)
    );
    let clip = format!("url(#{})", m.clip_id());
    let r = CapitalMarker::BADGE_RADIUS;

    rsx! {
        g {
            class: "capital-marker",
            style: "cursor: pointer;",
            onclick: move |evt: Event<MouseData>| {
                evt.stop_propagation();
                on_click.call(index);
            },
            line {
                x1: num(b.x),
                y1: num(b.y + 8.0),
                x2: num(t.x),
                y2: num(t.y),
                stroke: "#2f855a",
                stroke_width: "1.2",
                stroke_linecap: "round",
            }
            polygon { points: "{arrow}", fill: "#2f855a", stroke: "#214e3f", stroke_width: "0.4" }
            circle { cx: num(b.x), cy: num(b.y), r: num(r), fill: "#ffffff" }
            if let Some(url) = m.flag_url.clone() {
                clipPath {
                    id: m.clip_id(),
                    circle { cx: num(b.x), cy: num(b.y), r: num(r) }
                }
                image {
                    href: "{url}",
                    x: num(b.x - r),
                    y: num(b.y - r),
                    width: num(r * 2.0),
                    height: num(r * 2.0),
                    clip_path: "{clip}",
                    preserve_aspect_ratio: "xMidYMid slice",
                }
            } else {
                text {
                    x: num(b.x),
                    y: num(b.y + 4.0),
                    font_size: "9",
                    text_anchor: "middle",
                    fill: "#2f855a",
                    "{m.initial}"
                }
            }
            circle { cx: num(b.x), cy: num(b.y), r: num(r), fill: "none", stroke: "#2f855a", stroke_width: "1" }
        }
    }
}

#[derive(Props, Clone, PartialEq)]
struct CityProps {
    marker: CityMarker,
}

/// Value hexagon with period, value and name labels.
#[component]
fn City(props: CityProps) -> Element {
    let m = &props.marker;
    let (fill, stroke) = (m.category.fill(), m.category.stroke());
    let points = m.points();
    let labels = [
        (m.center.y - m.radius - 8.0, "10", "700", m.period_label.clone()),
        (m.center.y + 4.0, "12", "800", m.value_label()),
        (m.center.y + m.radius + 14.0, "11", "700", m.name.to_string()),
    ];
    let x = num(m.center.x);

    rsx! {
        g {
            pointer_events: "none",
            polygon { points: "{points}", fill: fill, stroke: stroke, stroke_width: "2" }
            for (y, size, weight, label) in labels {
                text {
                    x: "{x}",
                    y: num(y),
                    text_anchor: "middle",
                    font_size: size,
                    font_weight: weight,
                    fill: fill,
                    stroke: stroke,
                    stroke_width: "0.8",
                    style: "paint-order: stroke;",
                    "{label}"
                }
            }
        }
    }
}
