//! The drill-down map as a scene of SVG-ready shapes.
//!
//! Layers, bottom to top: graticule, country fills and capital markers
//! (hidden while a country is selected), detail geometry, provinces, the
//! selected country's title, and one hexagon per highlight city.

use crate::marker::{hex_radius, hexagon_points, points_attr, MarkerCategory};
use crate::projection::{graticule, Mercator};
use crate::svg::{escape, num, open};
use aero_core::catalog::{cities_for_region, HighlightCity};
use aero_core::index::TimeSeriesIndex;
use aero_core::region::{Region, RegionCollection};
use aero_core::selection::Selection;
use aero_core::timestamp::Timestamp;
use aero_data::aggregate::CityReading;
use aero_utils::format::fmt_value;
use geo::{Coord, Geometry};
use std::fmt::{self, Write};

pub const MAP_WIDTH: f64 = 900.0;
pub const MAP_HEIGHT: f64 = 600.0;
/// Values at or above this get the darkest choropleth color.
pub const CHOROPLETH_MAX: f64 = 120.0;
pub const GRATICULE_STEP: f64 = 5.0;
const FLAG_URL: &str = "https://flagcdn.com/w40";

const YL_OR_RD: [[u8; 3]; 9] = [
    [0xff, 0xff, 0xcc],
    [0xff, 0xed, 0xa0],
    [0xfe, 0xd9, 0x76],
    [0xfe, 0xb2, 0x4c],
    [0xfd, 0x8d, 0x3c],
    [0xfc, 0x4e, 0x2a],
    [0xe3, 0x1a, 0x1c],
    [0xbd, 0x00, 0x26],
    [0x80, 0x00, 0x26],
];

/// Sequential yellow-orange-red color for a value over `[0, CHOROPLETH_MAX]`.
pub fn choropleth_color(value: f64) -> String {
    let t = if value.is_finite() {
        (value / CHOROPLETH_MAX).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let scaled = t * (YL_OR_RD.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(YL_OR_RD.len() - 2);
    let f = scaled - i as f64;
    let (a, b) = (YL_OR_RD[i], YL_OR_RD[i + 1]);
    let mix = |k: usize| (a[k] as f64 + (b[k] as f64 - a[k] as f64) * f).round() as u8;
    format!("rgb({}, {}, {})", mix(0), mix(1), mix(2))
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionShape {
    pub index: usize,
    pub name: String,
    pub d: String,
    pub fill: String,
    pub stroke: &'static str,
    pub stroke_width: f64,
    pub selected: bool,
}

/// Pin over a country's label point, showing its flag or initial.
#[derive(Debug, Clone, PartialEq)]
pub struct CapitalMarker {
    pub region_index: usize,
    pub name: String,
    /// Projected label point; the pin's tip
    pub tip: Coord<f64>,
    pub flag_url: Option<String>,
    pub initial: String,
}

impl CapitalMarker {
    pub const BADGE_RADIUS: f64 = 10.0;

    fn new(region_index: usize, region: &Region, tip: Coord<f64>) -> Self {
        let iso2 = region
            .iso_a2
            .as_deref()
            .map(str::to_lowercase)
            .filter(|c| !c.is_empty());
        CapitalMarker {
            region_index,
            name: region.name.clone(),
            tip,
            flag_url: iso2.map(|c| format!("{}/{}.png", FLAG_URL, c)),
            initial: region.name.chars().next().map_or_else(|| "?".to_string(), |c| c.to_string()),
        }
    }

    /// Center of the round badge above the tip.
    pub fn badge(&self) -> Coord<f64> {
        Coord {
            x: self.tip.x,
            y: self.tip.y - 12.0,
        }
    }

    pub fn clip_id(&self) -> String {
        format!("clip-cap-{}", self.region_index)
    }
}

/// Value hexagon for a highlight city of the selected country.
#[derive(Debug, Clone, PartialEq)]
pub struct CityMarker {
    pub name: &'static str,
    pub center: Coord<f64>,
    pub value: Option<f64>,
    pub category: MarkerCategory,
    pub radius: f64,
    pub period_label: String,
}

impl CityMarker {
    pub fn new(name: &'static str, center: Coord<f64>, value: Option<f64>, period_label: String) -> Self {
        CityMarker {
            name,
            center,
            value,
            category: MarkerCategory::classify(value),
            radius: hex_radius(value),
            period_label,
        }
    }

    pub fn points(&self) -> String {
        points_attr(&hexagon_points(self.center, self.radius))
    }

    pub fn value_label(&self) -> String {
        fmt_value(self.value, 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleLabel {
    pub name: String,
    pub at: Coord<f64>,
}

/// Boundary layers currently loaded.
#[derive(Debug, Clone, Copy)]
pub struct MapLayers<'a> {
    pub base: &'a RegionCollection,
    /// Detail geometry of the selected country
    pub detail: Option<&'a RegionCollection>,
    pub provinces: Option<&'a RegionCollection>,
}

impl<'a> MapLayers<'a> {
    pub fn new(base: &'a RegionCollection) -> Self {
        MapLayers {
            base,
            detail: None,
            provinces: None,
        }
    }

    /// Projection the map should settle on: the whole base map in overview;
    /// the detail geometry, else the selected region, when drilled in.
    pub fn target_projection(&self, selection: &Selection, width: f64, height: f64) -> Mercator {
        let rect = match selection.region().and_then(|i| self.base.get(i)) {
            None => self.base.bounding_rect(),
            Some(region) => self
                .detail
                .and_then(RegionCollection::bounding_rect)
                .or_else(|| region.bounding_rect()),
        };
        Mercator::fit_view(width, height, rect)
    }
}

/// Timestamp picked by the overview slider.
pub fn overview_timestamp<'i>(index: &'i TimeSeriesIndex, selection: &Selection) -> Option<&'i Timestamp> {
    index.timestamps().get(selection.time_index())
}

/// Screen position of a highlight city: its name looked up in the base
/// regions, else its default coordinate, projected lon/lat then lat/lon;
/// failing that, the centroid of a region whose name contains the city's.
pub fn city_anchor(base: &RegionCollection, city: &HighlightCity, projection: &Mercator) -> Option<Coord<f64>> {
    let coord = base
        .find_coord_by_name(city.name)
        .unwrap_or_else(|| city.default_coord());
    projection.project_safe(coord).or_else(|| {
        base.find_containing(city.name)
            .and_then(Region::centroid)
            .and_then(|c| projection.project_safe(c))
    })
}

fn title_for(region: &Region, projection: &Mercator) -> Option<TitleLabel> {
    let bounds = projection.bounds(region.geometry.as_ref()?)?;
    let (y0, y1) = (bounds.min().y, bounds.max().y);
    let y = (y0 - 12f64.max((y1 - y0) * 0.06)).max(12.0) + 10.0;
    Some(TitleLabel {
        name: region.name.clone(),
        at: Coord {
            x: (bounds.min().x + bounds.max().x) / 2.0,
            y,
        },
    })
}

fn paths(regions: Option<&RegionCollection>, projection: &Mercator) -> Vec<String> {
    regions
        .map(|rc| {
            rc.iter()
                .filter_map(|r| r.geometry.as_ref())
                .map(|g| projection.path_d(g))
                .filter(|d| !d.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapScene {
    pub width: f64,
    pub height: f64,
    pub graticule: String,
    /// Country fills, capitals and graticule are hidden while drilled in
    pub base_visible: bool,
    pub regions: Vec<RegionShape>,
    pub capitals: Vec<CapitalMarker>,
    pub detail: Vec<String>,
    pub provinces: Vec<String>,
    pub title: Option<TitleLabel>,
    pub cities: Vec<CityMarker>,
    /// Overview date shown top-right
    pub date_label: Option<String>,
}

impl MapScene {
    pub fn build(
        layers: &MapLayers<'_>,
        index: &TimeSeriesIndex,
        selection: &Selection,
        projection: &Mercator,
        width: f64,
        height: f64,
    ) -> MapScene {
        let selected = selection.region();
        let overview_ts = overview_timestamp(index, selection);

        let regions = layers
            .base
            .iter()
            .enumerate()
            .filter_map(|(i, region)| {
                let d = projection.path_d(region.geometry.as_ref()?);
                let is_selected = selected == Some(i);
                let choropleth = overview_ts
                    .and_then(|ts| index.get(&region.name, ts))
                    .map(choropleth_color);
                let fill = choropleth.unwrap_or_else(|| {
                    match (layers.provinces.is_some(), is_selected) {
                        (true, true) => "#eafaf0",
                        (true, false) => "#d2efda",
                        (false, _) => "#dff7ea",
                    }
                    .to_string()
                });
                Some(RegionShape {
                    index: i,
                    name: region.name.clone(),
                    d,
                    fill,
                    stroke: if is_selected { "#166534" } else { "#2f855a" },
                    stroke_width: if is_selected { 1.2 } else { 0.8 },
                    selected: is_selected,
                })
            })
            .collect();

        let capitals = layers
            .base
            .iter()
            .enumerate()
            .filter_map(|(i, region)| {
                let tip = projection.project(region.label?)?;
                Some(CapitalMarker::new(i, region, tip))
            })
            .collect();

        let selected_region = selected.and_then(|i| layers.base.get(i));
        let title = selected_region.and_then(|r| title_for(r, projection));

        let cities = selected_region
            .map(|region| {
                let granularity = selection.granularity();
                let window = selection.window();
                let slot = selection.active_index();
                cities_for_region(region)
                    .into_iter()
                    .filter_map(|city| {
                        let center = city_anchor(layers.base, city, projection)?;
                        let reading = CityReading::new(index, city, granularity, &window);
                        let label = reading
                            .period(slot)
                            .map(|p| p.label())
                            .or_else(|| overview_ts.map(|ts| ts.date().format("%d/%m/%y").to_string()))
                            .unwrap_or_default();
                        Some(CityMarker::new(city.name, center, reading.current(granularity, slot), label))
                    })
                    .collect()
            })
            .unwrap_or_default();

        MapScene {
            width,
            height,
            graticule: projection.path_d(&Geometry::MultiLineString(graticule(GRATICULE_STEP))),
            base_visible: selected.is_none(),
            regions,
            capitals,
            detail: paths(layers.detail, projection),
            provinces: paths(layers.provinces, projection),
            title,
            cities,
            date_label: overview_ts.map(|ts| ts.date().format("%Y-%m-%d").to_string()),
        }
    }

    /// Standalone SVG document of the scene.
    pub fn to_svg(&self) -> String {
        let mut out = open(self.width, self.height);
        // writing to a String cannot fail
        let _ = self.write_body(&mut out);
        out.push_str("</svg>");
        out
    }

    fn write_body(&self, out: &mut String) -> fmt::Result {
        if self.base_visible {
            if let Some(date) = &self.date_label {
                write!(
                    out,
                    r##"<text x="{}" y="28" text-anchor="end" font-size="18" fill="#0b6630" font-weight="700">{}</text>"##,
                    num(self.width - 12.0),
                    escape(date)
                )?;
            }
        }
        write!(
            out,
            r#"<rect x="0" y="0" width="{}" height="{}" fill="transparent"/>"#,
            num(self.width),
            num(self.height)
        )?;

        out.push_str("<defs>");
        for cap in self.capitals.iter().filter(|c| c.flag_url.is_some()) {
            let b = cap.badge();
            write!(
                out,
                r#"<clipPath id="{}"><circle cx="{}" cy="{}" r="{}"/></clipPath>"#,
                cap.clip_id(),
                num(b.x),
                num(b.y),
                num(CapitalMarker::BADGE_RADIUS)
            )?;
        }
        out.push_str("</defs>");

        write!(out, r#"<g class="base-layer" opacity="{}">"#, if self.base_visible { 1 } else { 0 })?;
        write!(
            out,
            r##"<path class="map-grid" d="{}" fill="none" stroke="#bfe6cf" stroke-width="0.6" opacity="0.9"/>"##,
            self.graticule
        )?;
        for r in &self.regions {
            write!(
                out,
                r#"<path d="{}" fill="{}" stroke="{}" stroke-width="{}"><title>{}</title></path>"#,
                r.d,
                r.fill,
                r.stroke,
                num(r.stroke_width),
                escape(&r.name)
            )?;
        }
        for cap in &self.capitals {
            self.write_capital(out, cap)?;
        }
        out.push_str("</g>");

        if !self.detail.is_empty() {
            out.push_str(r#"<g class="country-detail-layer">"#);
            for d in &self.detail {
                write!(out, r##"<path d="{}" fill="rgba(255,255,255,0.02)" stroke="#0b6630" stroke-width="1"/>"##, d)?;
            }
            out.push_str("</g>");
        }
        if !self.provinces.is_empty() {
            out.push_str(r#"<g class="provinces-layer">"#);
            for d in &self.provinces {
                write!(
                    out,
                    r##"<path d="{}" fill="#fff8e6" stroke="#d6b74a" stroke-width="0.6" opacity="0.95"/>"##,
                    d
                )?;
            }
            out.push_str("</g>");
        }

        if let Some(title) = &self.title {
            let (x, y, name) = (num(title.at.x), num(title.at.y), escape(&title.name));
            write!(
                out,
                r##"<text x="{x}" y="{y}" text-anchor="middle" font-size="18" font-weight="700" fill="none" stroke="#ffffff" stroke-width="5" stroke-linejoin="round">{name}</text><text x="{x}" y="{y}" text-anchor="middle" font-size="18" font-weight="700" fill="#0b6630">{name}</text>"##
            )?;
        }

        for city in &self.cities {
            self.write_city(out, city)?;
        }
        Ok(())
    }

    fn write_capital(&self, out: &mut String, cap: &CapitalMarker) -> fmt::Result {
        let b = cap.badge();
        let t = cap.tip;
        write!(out, r#"<g class="capital-marker" aria-label="{}">"#, escape(&cap.name))?;
        write!(
            out,
            r##"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="#2f855a" stroke-width="1.2" stroke-linecap="round"/>"##,
            num(b.x),
            num(b.y + 8.0),
            num(t.x),
            num(t.y)
        )?;
        write!(
            out,
            r##"<polygon points="{},{} {},{} {},{}" fill="#2f855a" stroke="#214e3f" stroke-width="0.4"/>"##,
            num(t.x - 4.0),
            num(t.y - 3.0),
            num(t.x + 4.0),
            num(t.y - 3.0),
            num(t.x),
            num(t.y + 4.0)
        )?;
        write!(out, r##"<circle cx="{}" cy="{}" r="10" fill="#ffffff"/>"##, num(b.x), num(b.y))?;
        match &cap.flag_url {
            Some(url) => write!(
                out,
                r#"<g clip-path="url(#{})"><image href="{}" x="{}" y="{}" width="20" height="20" preserveAspectRatio="xMidYMid slice"/></g>"#,
                cap.clip_id(),
                escape(url),
                num(b.x - 10.0),
                num(b.y - 10.0)
            )?,
            None => write!(
                out,
                r##"<text x="{}" y="{}" font-size="9" text-anchor="middle" fill="#2f855a">{}</text>"##,
                num(b.x),
                num(b.y + 4.0),
                escape(&cap.initial)
            )?,
        }
        write!(
            out,
            r##"<circle cx="{}" cy="{}" r="10" fill="none" stroke="#2f855a" stroke-width="1"/></g>"##,
            num(b.x),
            num(b.y)
        )
    }

    fn write_city(&self, out: &mut String, city: &CityMarker) -> fmt::Result {
        let (fill, stroke) = (city.category.fill(), city.category.stroke());
        let (cx, cy) = (city.center.x, city.center.y);
        write!(
            out,
            r#"<g pointer-events="none"><polygon points="{}" fill="{}" stroke="{}" stroke-width="2"/>"#,
            city.points(),
            fill,
            stroke
        )?;
        let value = city.value_label();
        let lines = [
            (cy - city.radius - 8.0, 10, 700, city.period_label.as_str()),
            (cy + 4.0, 12, 800, value.as_str()),
            (cy + city.radius + 14.0, 11, 700, city.name),
        ];
        for (y, size, weight, text) in lines {
            write!(
                out,
                r#"<text x="{}" y="{}" text-anchor="middle" font-size="{}" font-weight="{}" fill="{}" stroke="{}" stroke-width="0.8" paint-order="stroke">{}</text>"#,
                num(cx),
                num(y),
                size,
                weight,
                fill,
                stroke,
                escape(text)
            )?;
        }
        out.push_str("</g>");
        Ok(())
    }
}
