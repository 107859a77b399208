//! Daily time-lapse: one circle per site over the detail map, plus a small
//! chart of the site's readings in the current seasonal window.

use crate::projection::Mercator;
use crate::svg::{escape, num, open};
use aero_core::catalog::city_by_name;
use aero_core::region::RegionCollection;
use aero_data::daily::DailyTable;
use aero_utils::dates::{format_day_label, Season, SeasonPeriod};
use chrono::{Datelike, NaiveDate};
use std::fmt::{self, Write};

pub const TIMELAPSE_WIDTH: f64 = 900.0;
pub const TIMELAPSE_HEIGHT: f64 = 600.0;
pub const PERIOD_CHART_WIDTH: f64 = 320.0;
pub const PERIOD_CHART_HEIGHT: f64 = 220.0;
/// Fixed upper bound of the period chart's y axis.
pub const PERIOD_AXIS_MAX: f64 = 80.0;
const MISSING_FILL: &str = "#999";
const GRID_FRACTIONS: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];

/// `8 + pm * 1.6`, capped at 120; a missing reading draws the minimum.
pub fn circle_radius(pm: Option<f64>) -> f64 {
    (8.0 + pm.unwrap_or(0.0) * 1.6).min(120.0)
}

pub fn season_color(season: Season) -> &'static str {
    match season {
        Season::Wet => "#0ea5e9",
        Season::Dry => "#f97316",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteCircle {
    pub site: String,
    pub center: geo::Coord<f64>,
    pub radius: f64,
    pub fill: &'static str,
    pub label: String,
}

impl SiteCircle {
    pub fn font_size(&self) -> f64 {
        (self.radius / 3.0).clamp(10.0, 20.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelapseScene {
    pub width: f64,
    pub height: f64,
    pub outline: Vec<String>,
    pub circles: Vec<SiteCircle>,
    pub title: String,
    pub date_label: String,
    pub season: Season,
}

impl TimelapseScene {
    /// Scene for one date. Sites without a known coordinate are skipped.
    pub fn build(
        regions: &RegionCollection,
        table: &DailyTable,
        site: &str,
        date: NaiveDate,
        width: f64,
        height: f64,
    ) -> TimelapseScene {
        let projection = Mercator::fit_view(width, height, regions.bounding_rect());
        let outline = regions
            .iter()
            .filter_map(|r| r.geometry.as_ref())
            .map(|g| projection.path_d(g))
            .filter(|d| !d.is_empty())
            .collect();
        let circles = table
            .on(date)
            .filter_map(|reading| {
                let coord = city_by_name(&reading.site)?.default_coord();
                let center = projection.project(coord)?;
                Some(SiteCircle {
                    site: reading.site.clone(),
                    center,
                    radius: circle_radius(reading.pm25),
                    fill: reading.category.map_or(MISSING_FILL, |c| c.color()),
                    label: reading.pm25.map(|v| format!("{:.0}", v)).unwrap_or_default(),
                })
            })
            .collect();
        let period = SeasonPeriod::for_date(&date);
        TimelapseScene {
            width,
            height,
            outline,
            circles,
            title: format!("{} - PM2.5 (avg) - {}", site, period.label(date.year())),
            date_label: format_day_label(&date),
            season: period.season(),
        }
    }

    pub fn to_svg(&self) -> String {
        let mut out = open(self.width, self.height);
        let _ = self.write_body(&mut out);
        out.push_str("</svg>");
        out
    }

    fn write_body(&self, out: &mut String) -> fmt::Result {
        for f in GRID_FRACTIONS {
            write!(
                out,
                r##"<line x1="{x}" x2="{x}" y1="0" y2="{}" stroke="#e6eef6" stroke-dasharray="3 4"/>"##,
                num(self.height),
                x = num(self.width * f)
            )?;
            write!(
                out,
                r##"<line x1="0" x2="{}" y1="{y}" y2="{y}" stroke="#e6eef6" stroke-dasharray="3 4"/>"##,
                num(self.width),
                y = num(self.height * f)
            )?;
        }
        for d in &self.outline {
            write!(out, r##"<path d="{}" fill="#f8fafc" stroke="#94a3b8" stroke-width="0.8"/>"##, d)?;
        }
        for c in &self.circles {
            write!(
                out,
                r#"<circle cx="{}" cy="{}" r="{}" fill="{}" opacity="0.7"><title>{}</title></circle>"#,
                num(c.center.x),
                num(c.center.y),
                num(c.radius),
                c.fill,
                escape(&c.site)
            )?;
            write!(
                out,
                r##"<text x="{}" y="{}" text-anchor="middle" dominant-baseline="central" font-size="{}" font-weight="700" fill="#fff">{}</text>"##,
                num(c.center.x),
                num(c.center.y),
                num(c.font_size()),
                c.label
            )?;
        }
        write!(
            out,
            r##"<text x="16" y="28" font-size="18" font-weight="700" fill="#0f172a">{}</text><text x="{}" y="28" text-anchor="end" font-size="16" font-weight="700" fill="{}">{}</text>"##,
            escape(&self.title),
            num(self.width - 16.0),
            season_color(self.season),
            escape(&self.date_label)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodPoint {
    pub x: f64,
    pub y: f64,
    pub date: NaiveDate,
    pub unhealthy: bool,
}

/// Readings of one site in the seasonal window of the current date.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodChart {
    pub width: f64,
    pub height: f64,
    pub d: String,
    pub points: Vec<PeriodPoint>,
    /// Current date's point, if it has a reading
    pub selected: Option<PeriodPoint>,
    pub y_ticks: Vec<(f64, u32)>,
    pub x_ticks: Vec<(f64, String)>,
    pub title: String,
}

impl PeriodChart {
    /// `None` when the site has no readings in the window.
    pub fn build(table: &DailyTable, site: &str, date: NaiveDate, width: f64, height: f64) -> Option<PeriodChart> {
        let rows = table.period_series(site, date);
        let (t0, t1) = (rows.first()?.date, rows.last()?.date);
        let span = ((t1 - t0).num_days() as f64).max(1.0);
        let x = |d: NaiveDate| (d - t0).num_days() as f64 / span * (width - 30.0) + 20.0;
        let y = |v: f64| height - 20.0 - v / PERIOD_AXIS_MAX * (height - 40.0);

        let points: Vec<PeriodPoint> = rows
            .iter()
            .filter_map(|r| {
                let v = r.pm25?;
                Some(PeriodPoint {
                    x: x(r.date),
                    y: y(v),
                    date: r.date,
                    unhealthy: r.category.is_some_and(|c| c.is_unhealthy()),
                })
            })
            .collect();
        let mut d = String::new();
        for (i, p) in points.iter().enumerate() {
            let _ = write!(d, "{}{:.2},{:.2}", if i == 0 { "M" } else { "L" }, p.x, p.y);
        }
        let selected = points.iter().find(|p| p.date == date).cloned();
        let y_ticks = (0..=8).map(|i| (y(i as f64 * 10.0), i * 10)).collect();
        let x_ticks = t0
            .iter_days()
            .take_while(|d| *d <= t1)
            .step_by(10)
            .map(|d| (x(d), d.format("%d/%m").to_string()))
            .collect();
        let period = SeasonPeriod::for_date(&date);
        Some(PeriodChart {
            width,
            height,
            d,
            points,
            selected,
            y_ticks,
            x_ticks,
            title: period.label(date.year()),
        })
    }

    pub fn to_svg(&self) -> String {
        let mut out = open(self.width, self.height);
        let _ = self.write_body(&mut out);
        out.push_str("</svg>");
        out
    }

    fn write_body(&self, out: &mut String) -> fmt::Result {
        for (y, v) in &self.y_ticks {
            write!(
                out,
                r##"<line x1="20" x2="{}" y1="{y}" y2="{y}" stroke="#eef2f7"/><text x="16" y="{y}" text-anchor="end" font-size="9" fill="#64748b">{}</text>"##,
                num(self.width - 10.0),
                v,
                y = num(*y)
            )?;
        }
        for (x, label) in &self.x_ticks {
            write!(
                out,
                r##"<line x1="{x}" x2="{x}" y1="20" y2="{}" stroke="#eef2f7"/><text x="{x}" y="{}" text-anchor="middle" font-size="9" fill="#64748b">{}</text>"##,
                num(self.height - 20.0),
                num(self.height - 6.0),
                label,
                x = num(*x)
            )?;
        }
        write!(out, r#"<path d="{}" fill="none" stroke="black" stroke-width="1.5"/>"#, self.d)?;
        for p in &self.points {
            let (r, fill) = if p.unhealthy { (6.0, "red") } else { (2.2, "#6b7280") };
            write!(out, r#"<circle cx="{}" cy="{}" r="{}" fill="{}"/>"#, num(p.x), num(p.y), num(r), fill)?;
        }
        if let Some(p) = &self.selected {
            write!(
                out,
                r##"<circle cx="{}" cy="{}" r="8" fill="none" stroke="#f97316" stroke-width="2.5"/>"##,
                num(p.x),
                num(p.y)
            )?;
        }
        write!(
            out,
            r##"<text x="20" y="14" font-size="11" font-weight="700" fill="#0f172a">{}</text>"##,
            escape(&self.title)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAILY: &str = "Site,Year,Month,Day,PM2.5 (avg),AQI Category\n\
        Ho Chi Minh City,2023,3,1,20,Moderate\n\
        Ho Chi Minh City,2023,3,11,45,Unhealthy for Sensitive Groups\n\
        Ho Chi Minh City,2023,3,21,,\n\
        Ho Chi Minh City,2023,4,30,10,Good\n\
        Atlantis,2023,3,1,5,Good\n";

    const OUTLINE: &str = r#"{"type":"Polygon","coordinates":[[[102.0,8.5],[109.5,8.5],[109.5,23.4],[102.0,23.4],[102.0,8.5]]]}"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_circle_radius() {
        assert_eq!(circle_radius(None), 8.0);
        assert_eq!(circle_radius(Some(10.0)), 24.0);
        assert_eq!(circle_radius(Some(500.0)), 120.0);
    }

    #[test]
    fn test_scene_for_date() {
        let regions = RegionCollection::parse(OUTLINE).unwrap();
        let table = DailyTable::from_csv(DAILY);
        let scene = TimelapseScene::build(&regions, &table, "Ho Chi Minh City", date(2023, 3, 11), 900.0, 600.0);
        // unknown sites have no coordinate
        assert_eq!(scene.circles.len(), 1);
        let c = &scene.circles[0];
        assert_eq!(c.radius, 8.0 + 45.0 * 1.6);
        assert_eq!(c.fill, "#ef4444");
        assert_eq!(c.label, "45");
        assert_eq!(scene.title, "Ho Chi Minh City - PM2.5 (avg) - Dry (Mar 1st - Apr 30th)");
        assert_eq!(scene.date_label, "11/03/23");
        assert_eq!(scene.season, Season::Dry);
        assert_eq!(scene.outline.len(), 1);
        assert!(scene.to_svg().contains("<circle"));
    }

    #[test]
    fn test_missing_reading_is_gray() {
        let regions = RegionCollection::parse(OUTLINE).unwrap();
        let table = DailyTable::from_csv(DAILY);
        let scene = TimelapseScene::build(&regions, &table, "Ho Chi Minh City", date(2023, 3, 21), 900.0, 600.0);
        assert_eq!(scene.circles[0].fill, MISSING_FILL);
        assert_eq!(scene.circles[0].label, "");
    }

    #[test]
    fn test_period_chart() {
        let table = DailyTable::from_csv(DAILY);
        let chart = PeriodChart::build(&table, "Ho Chi Minh City", date(2023, 3, 11), 320.0, 220.0).unwrap();
        assert_eq!(chart.points.len(), 3);
        assert_eq!(chart.points[0].x, 20.0);
        assert_eq!(chart.points[2].x, 310.0);
        assert_eq!(chart.points[0].y, 220.0 - 20.0 - 20.0 / 80.0 * 180.0);
        assert!(chart.points[1].unhealthy);
        assert!(!chart.points[0].unhealthy);
        assert_eq!(chart.selected.as_ref().map(|p| p.date), Some(date(2023, 3, 11)));
        assert_eq!(chart.y_ticks.len(), 9);
        assert_eq!(chart.x_ticks[0].1, "01/03");
        assert_eq!(chart.d.matches('L').count(), 2);
        assert!(PeriodChart::build(&table, "Ho Chi Minh City", date(2023, 8, 1), 320.0, 220.0).is_none());
    }
}
