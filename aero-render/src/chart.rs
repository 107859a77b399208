//! Dual-axis monthly chart: AOD on the left axis, PM2.5 on the right.

use crate::svg::{escape, num, open};
use aero_data::series::{MonthlySeries, SeriesMode};
use aero_utils::dates::{month_name, Season};
use std::fmt::{self, Write};

pub const CHART_WIDTH: f64 = 380.0;
pub const CHART_HEIGHT: f64 = 240.0;

/// The AOD axis always reaches at least this value.
pub const AOD_AXIS_FLOOR: f64 = 1.5;
/// The PM2.5 axis always reaches at least this value.
pub const PM_AXIS_FLOOR: f64 = 200.0;

const PAD_TOP: f64 = 12.0;
const PAD_RIGHT: f64 = 56.0;
const PAD_BOTTOM: f64 = 36.0;
const PAD_LEFT: f64 = 36.0;

const DRY_FILL: &str = "rgba(255,165,0,0.12)";
const WET_FILL: &str = "rgba(125,185,222,0.15)";

/// A category level drawn on both axes at once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdLevel {
    pub key: &'static str,
    pub aod: f64,
    pub pm: f64,
    pub color: &'static str,
    pub aod_label: &'static str,
    pub pm_label: &'static str,
}

pub const THRESHOLDS: [ThresholdLevel; 3] = [
    ThresholdLevel {
        key: "Good",
        aod: 0.3,
        pm: 50.0,
        color: "#34A853",
        aod_label: "Good (< 0.3)",
        pm_label: "Good (0-50)",
    },
    ThresholdLevel {
        key: "Moderate",
        aod: 0.7,
        pm: 100.0,
        color: "#FB8C00",
        aod_label: "Moderate (> 0.7)",
        pm_label: "Moderate (51-100)",
    },
    ThresholdLevel {
        key: "Hazardous",
        aod: 1.0,
        pm: 200.0,
        color: "#D93025",
        aod_label: "Hazardous (> 1.0)",
        pm_label: "Hazardous (101+)",
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonBand {
    pub x: f64,
    pub width: f64,
    pub fill: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdLine {
    pub level: ThresholdLevel,
    pub y: f64,
}

/// One plotted series. Each run of consecutive months is its own subpath.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLine {
    pub d: String,
    pub area: String,
    pub dots: Vec<(f64, f64)>,
    pub stroke: &'static str,
    pub area_fill: &'static str,
    pub dot_fill: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthTick {
    pub x: f64,
    pub label: &'static str,
    pub season: Season,
}

impl MonthTick {
    pub fn color(&self) -> &'static str {
        match self.season {
            Season::Wet => "#1a73e8",
            Season::Dry => "#e67700",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartScene {
    pub width: f64,
    pub height: f64,
    pub aod_max: f64,
    pub pm_max: f64,
    pub bands: Vec<SeasonBand>,
    /// y of the AOD grid lines at max, half and zero
    pub grid: Vec<f64>,
    pub thresholds: Vec<ThresholdLine>,
    pub aod: Option<ChartLine>,
    pub pm: Option<ChartLine>,
    pub months: Vec<MonthTick>,
}

struct Frame {
    width: f64,
    height: f64,
}

impl Frame {
    fn inner_w(&self) -> f64 {
        self.width - PAD_LEFT - PAD_RIGHT
    }

    fn inner_h(&self) -> f64 {
        self.height - PAD_TOP - PAD_BOTTOM
    }

    fn bottom(&self) -> f64 {
        PAD_TOP + self.inner_h()
    }

    /// x of a 1-based month.
    fn x(&self, month: u32) -> f64 {
        (month - 1) as f64 / 11.0 * self.inner_w() + PAD_LEFT
    }

    fn y(&self, value: f64, max: f64) -> f64 {
        PAD_TOP + (1.0 - value / max) * self.inner_h()
    }

    fn line(&self, series: &MonthlySeries, max: f64, stroke: &'static str, area_fill: &'static str) -> ChartLine {
        let mut d = String::new();
        let mut area = String::new();
        let mut dots = Vec::new();
        let mut run: Vec<(f64, f64)> = Vec::new();
        let mut flush = |run: &mut Vec<(f64, f64)>| {
            if let (Some(first), Some(last)) = (run.first().copied(), run.last().copied()) {
                let mut sub = String::new();
                for (i, (x, y)) in run.iter().enumerate() {
                    let _ = write!(sub, "{}{:.2} {:.2}", if i == 0 { "M " } else { " L " }, x, y);
                }
                d.push_str(&sub);
                let _ = write!(
                    area,
                    "{} L {:.2} {:.2} L {:.2} {:.2} Z",
                    sub,
                    last.0,
                    self.bottom(),
                    first.0,
                    self.bottom()
                );
            }
            run.clear();
        };
        for (month, value) in series.iter() {
            match value {
                Some(v) => {
                    let p = (self.x(month), self.y(v, max));
                    dots.push(p);
                    run.push(p);
                }
                None => flush(&mut run),
            }
        }
        flush(&mut run);
        ChartLine {
            d,
            area,
            dots,
            stroke,
            area_fill,
            dot_fill: stroke,
        }
    }
}

fn clamp_fraction(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

impl ChartScene {
    /// `None` when neither series has a single value.
    pub fn build(aod: &MonthlySeries, pm: &MonthlySeries, mode: SeriesMode, width: f64, height: f64) -> Option<ChartScene> {
        if !aod.has_data() && !pm.has_data() {
            return None;
        }
        let frame = Frame { width, height };
        let aod_max = aod.max().map_or(AOD_AXIS_FLOOR, |m| m.max(AOD_AXIS_FLOOR));
        let pm_max = pm.max().map_or(PM_AXIS_FLOOR, |m| m.max(PM_AXIS_FLOOR));

        let half = frame.inner_w() / 24.0;
        let band = |from: u32, to: Option<u32>, fill| {
            let start = frame.x(from) - half;
            let end = to.map_or(PAD_LEFT + frame.inner_w(), |m| frame.x(m) + half);
            SeasonBand {
                x: start,
                width: (end - start).max(0.0),
                fill,
            }
        };
        let bands = vec![
            band(1, Some(4), DRY_FILL),
            band(5, Some(11), WET_FILL),
            band(12, None, DRY_FILL),
        ];

        let thresholds = THRESHOLDS
            .iter()
            .map(|level| {
                let frac = (clamp_fraction(level.aod, aod_max) + clamp_fraction(level.pm, pm_max)) / 2.0;
                ThresholdLine {
                    level: *level,
                    y: PAD_TOP + (1.0 - frac) * frame.inner_h(),
                }
            })
            .collect();

        let months = (1..=12)
            .map(|m| MonthTick {
                x: frame.x(m),
                label: month_name(m).map_or("", |n| &n[..3]),
                season: Season::for_month(m),
            })
            .collect();

        Some(ChartScene {
            width,
            height,
            aod_max,
            pm_max,
            bands,
            grid: [aod_max, aod_max / 2.0, 0.0]
                .iter()
                .map(|v| frame.y(*v, aod_max))
                .collect(),
            thresholds,
            aod: (mode.shows_aod() && aod.has_data())
                .then(|| frame.line(aod, aod_max, "#0f766e", "rgba(15,118,110,0.08)")),
            pm: (mode.shows_pm25() && pm.has_data())
                .then(|| frame.line(pm, pm_max, "#7f1d1d", "rgba(127,29,29,0.06)")),
            months,
        })
    }

    pub fn inner_right(&self) -> f64 {
        self.width - PAD_RIGHT
    }

    pub fn to_svg(&self) -> String {
        let mut out = open(self.width, self.height);
        let _ = self.write_body(&mut out);
        out.push_str("</svg>");
        out
    }

    fn write_body(&self, out: &mut String) -> fmt::Result {
        for b in &self.bands {
            write!(
                out,
                r#"<rect x="{}" y="0" width="{}" height="{}" fill="{}"/>"#,
                num(b.x),
                num(b.width),
                num(self.height),
                b.fill
            )?;
        }
        for y in &self.grid {
            write!(
                out,
                r#"<line x1="{}" x2="{}" y1="{y}" y2="{y}" stroke="rgba(0,0,0,0.06)"/>"#,
                num(PAD_LEFT),
                num(self.inner_right()),
                y = num(*y)
            )?;
        }
        for t in &self.thresholds {
            let label_y = (t.y - 6.0).min(self.height - 12.0).max(PAD_TOP + 10.0);
            write!(
                out,
                r#"<line x1="{}" x2="{}" y1="{y}" y2="{y}" stroke="{c}" stroke-width="1.25" stroke-dasharray="6,4" opacity="0.9"/>"#,
                num(PAD_LEFT),
                num(self.inner_right()),
                y = num(t.y),
                c = t.level.color
            )?;
            write!(
                out,
                r#"<text x="{}" y="{}" font-size="10" fill="{}" font-weight="600">{}</text>"#,
                num(PAD_LEFT + 12.0),
                num(label_y),
                t.level.color,
                escape(t.level.aod_label)
            )?;
            write!(
                out,
                r#"<text x="{}" y="{}" font-size="10" fill="{}" font-weight="600" text-anchor="end">{}</text>"#,
                num(self.inner_right() - 8.0),
                num(label_y),
                t.level.color,
                escape(t.level.pm_label)
            )?;
        }
        for line in [&self.aod, &self.pm].into_iter().flatten() {
            write!(
                out,
                r#"<path d="{}" fill="none" stroke="{}" stroke-width="2.2" stroke-linejoin="round" stroke-linecap="round"/><path d="{}" fill="{}"/>"#,
                line.d,
                line.stroke,
                line.area,
                line.area_fill
            )?;
            for (x, y) in &line.dots {
                write!(out, r#"<circle cx="{}" cy="{}" r="3.4" fill="{}"/>"#, num(*x), num(*y), line.dot_fill)?;
            }
        }
        for m in &self.months {
            write!(
                out,
                r#"<text x="{}" y="{}" font-size="10" text-anchor="middle" fill="{}" font-weight="bold">{}</text>"#,
                num(m.x),
                num(self.height - 10.0),
                m.color(),
                m.label
            )?;
        }
        let bottom = self.height - PAD_BOTTOM;
        write!(
            out,
            r##"<text x="6" y="{}" font-size="11" fill="#07332d">{:.2}</text><text x="6" y="{}" font-size="11" fill="#07332d">0.00</text>"##,
            num(PAD_TOP + 10.0),
            self.aod_max,
            num(bottom)
        )?;
        write!(
            out,
            r##"<text x="{x}" y="{}" font-size="11" fill="#7f1d1d">{:.0}</text><text x="{x}" y="{}" font-size="11" fill="#7f1d1d">0</text>"##,
            num(PAD_TOP + 10.0),
            self.pm_max,
            num(bottom),
            x = num(self.inner_right() + 8.0)
        )?;
        write!(
            out,
            r##"<rect x="{}" y="6" width="170" height="36" fill="rgba(255,255,255,0.85)" rx="3"/><g transform="translate({}, 16)"><rect width="12" height="8" fill="rgba(255,165,0,0.4)"/><text x="16" y="7" font-size="9" fill="#333" font-weight="bold">Dry Season (Dec, Jan-Apr)</text></g><g transform="translate({}, 30)"><rect width="12" height="8" fill="rgba(125,185,222,0.5)"/><text x="16" y="7" font-size="9" fill="#333" font-weight="bold">Wet Season (May-Nov)</text></g>"##,
            num(PAD_LEFT + 8.0),
            num(PAD_LEFT + 16.0),
            num(PAD_LEFT + 16.0)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aero_core::monthly::parse_monthly_csv;

    fn series(text: &str) -> MonthlySeries {
        MonthlySeries::from_records(&parse_monthly_csv(Some(text)), Some(2021))
    }

    #[test]
    fn test_axis_floors() {
        let aod = series("Month,Value\n2021-01,0.8\n");
        let scene = ChartScene::build(&aod, &MonthlySeries::default(), SeriesMode::Both, CHART_WIDTH, CHART_HEIGHT).unwrap();
        assert_eq!(scene.aod_max, 1.5);
        assert_eq!(scene.pm_max, 200.0);
        assert!(scene.pm.is_none());

        let high = series("Month,Value\n2021-01,2.5\n");
        let pm = series("Month,PM2.5\n2021-01,250\n");
        let scene = ChartScene::build(&high, &pm, SeriesMode::Both, CHART_WIDTH, CHART_HEIGHT).unwrap();
        assert_eq!(scene.aod_max, 2.5);
        assert_eq!(scene.pm_max, 250.0);
    }

    #[test]
    fn test_threshold_lines_average_fractions() {
        let aod = series("Month,Value\n2021-01,0.8\n");
        let scene = ChartScene::build(&aod, &MonthlySeries::default(), SeriesMode::Aod, CHART_WIDTH, CHART_HEIGHT).unwrap();
        // Good: (0.3/1.5 + 50/200) / 2 = 0.225 of a 192px plot
        assert!((scene.thresholds[0].y - (12.0 + 0.775 * 192.0)).abs() < 1e-9);
        // Hazardous: (1.0/1.5 + 1.0) / 2
        let frac = (1.0 / 1.5 + 1.0) / 2.0;
        assert!((scene.thresholds[2].y - (12.0 + (1.0 - frac) * 192.0)).abs() < 1e-9);
    }

    #[test]
    fn test_gaps_split_the_line() {
        let aod = series("Month,Value\n2021-01,0.5\n2021-02,0.6\n2021-04,0.4\n");
        let scene = ChartScene::build(&aod, &MonthlySeries::default(), SeriesMode::Aod, CHART_WIDTH, CHART_HEIGHT).unwrap();
        let line = scene.aod.unwrap();
        assert_eq!(line.d.matches('M').count(), 2);
        assert_eq!(line.dots.len(), 3);
        assert_eq!(scene.months.len(), 12);
        assert_eq!(scene.months[0].label, "Jan");
        assert_eq!(scene.months[0].x, 36.0);
        assert_eq!(scene.months[11].x, 324.0);
    }

    #[test]
    fn test_mode_and_empty() {
        let aod = series("Month,Value\n2021-01,0.5\n");
        let pm = series("Month,PM2.5\n2021-03,40\n");
        let scene = ChartScene::build(&aod, &pm, SeriesMode::Pm25, CHART_WIDTH, CHART_HEIGHT).unwrap();
        assert!(scene.aod.is_none());
        assert!(scene.pm.is_some());
        assert!(scene.to_svg().contains("#7f1d1d"));
        assert!(ChartScene::build(&MonthlySeries::default(), &MonthlySeries::default(), SeriesMode::Both, 380.0, 240.0).is_none());
    }

    #[test]
    fn test_season_bands() {
        let aod = series("Month,Value\n2021-01,0.5\n");
        let scene = ChartScene::build(&aod, &MonthlySeries::default(), SeriesMode::Aod, CHART_WIDTH, CHART_HEIGHT).unwrap();
        assert_eq!(scene.bands.len(), 3);
        assert_eq!(scene.bands[1].fill, WET_FILL);
        // December band runs to the right edge of the plot
        assert!((scene.bands[2].x + scene.bands[2].width - 324.0).abs() < 1e-9);
    }
}
