use geo::Coord;
use std::f64::consts::PI;

/// Hexagon marker band for a PM2.5 value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerCategory {
    Good,
    Moderate,
    Hazardous,
    /// No value for the period
    Missing,
}

impl MarkerCategory {
    /// `<= 35` good, `<= 55` moderate, above that hazardous.
    pub fn classify(value: Option<f64>) -> MarkerCategory {
        match value.filter(|v| v.is_finite()) {
            None => MarkerCategory::Missing,
            Some(v) if v <= 35.0 => MarkerCategory::Good,
            Some(v) if v <= 55.0 => MarkerCategory::Moderate,
            Some(_) => MarkerCategory::Hazardous,
        }
    }

    pub fn fill(&self) -> &'static str {
        match self {
            MarkerCategory::Good => "rgba(69, 194, 136, 1)",
            MarkerCategory::Moderate => "#e28b12ff",
            MarkerCategory::Hazardous => "rgba(246, 10, 10, 1)",
            MarkerCategory::Missing => "#d1fae5",
        }
    }

    pub fn stroke(&self) -> &'static str {
        match self {
            MarkerCategory::Good => "#054a37ff",
            MarkerCategory::Moderate => "#854310ff",
            MarkerCategory::Hazardous => "#591313ff",
            MarkerCategory::Missing => "#000000",
        }
    }
}

pub fn hex_radius(value: Option<f64>) -> f64 {
    match value.filter(|v| v.is_finite()) {
        Some(v) => 6.0 + (v * 0.5555).min(30.0),
        None => 7.0,
    }
}

/// Pointy-top hexagon vertices around `center`.
pub fn hexagon_points(center: Coord<f64>, r: f64) -> Vec<Coord<f64>> {
    (0..6)
        .map(|i| {
            let angle = PI / 3.0 * i as f64 - PI / 6.0;
            Coord {
                x: center.x + r * angle.cos(),
                y: center.y + r * angle.sin(),
            }
        })
        .collect()
}

/// SVG `points` attribute.
pub fn points_attr(points: &[Coord<f64>]) -> String {
    points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(MarkerCategory::classify(Some(35.0)), MarkerCategory::Good);
        assert_eq!(MarkerCategory::classify(Some(35.01)), MarkerCategory::Moderate);
        assert_eq!(MarkerCategory::classify(Some(55.0)), MarkerCategory::Moderate);
        assert_eq!(MarkerCategory::classify(Some(55.01)), MarkerCategory::Hazardous);
        assert_eq!(MarkerCategory::classify(None), MarkerCategory::Missing);
        assert_eq!(MarkerCategory::classify(Some(f64::NAN)), MarkerCategory::Missing);
        assert_eq!(MarkerCategory::Missing.fill(), "#d1fae5");
    }

    #[test]
    fn test_radius() {
        assert_eq!(hex_radius(None), 7.0);
        assert_eq!(hex_radius(Some(0.0)), 6.0);
        assert_eq!(hex_radius(Some(200.0)), 36.0);
        assert!((hex_radius(Some(10.0)) - 11.555).abs() < 1e-9);
    }

    #[test]
    fn test_hexagon() {
        let pts = hexagon_points(Coord { x: 0.0, y: 0.0 }, 10.0);
        assert_eq!(pts.len(), 6);
        for p in &pts {
            assert!(((p.x * p.x + p.y * p.y).sqrt() - 10.0).abs() < 1e-9);
        }
        // first vertex sits 30 degrees above the x axis
        assert!((pts[0].y + 5.0).abs() < 1e-9);
        assert_eq!(points_attr(&pts[..1]), "8.66,-5.00");
    }
}
