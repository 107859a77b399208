//! Spherical Mercator fitted to a pixel viewport.
//!
//! Coordinates are lon/lat degrees in, SVG pixels (y down) out. `scale` is
//! pixels per radian and `translate` is where lon/lat (0, 0) lands.

use geo::{BoundingRect, Coord, Geometry, LineString, MultiLineString, Rect};
use std::f64::consts::FRAC_PI_4;
use std::fmt::Write;

/// Scale used when nothing can be fitted.
pub const DEFAULT_SCALE: f64 = 1000.0;
/// Lon/lat placed at [`DEFAULT_ORIGIN`] when nothing can be fitted.
pub const DEFAULT_CENTER: [f64; 2] = [108.0, 15.0];
const DEFAULT_ORIGIN: [f64; 2] = [480.0, 250.0];
/// Pixels left free around a fitted extent.
pub const FIT_MARGIN: f64 = 20.0;

fn raw(lon: f64, lat: f64) -> Coord<f64> {
    Coord {
        x: lon.to_radians(),
        y: -(FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln(),
    }
}

fn finite(c: Coord<f64>) -> Option<Coord<f64>> {
    (c.x.is_finite() && c.y.is_finite()).then_some(c)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mercator {
    pub scale: f64,
    pub translate: Coord<f64>,
}

impl Default for Mercator {
    fn default() -> Self {
        let center = raw(DEFAULT_CENTER[0], DEFAULT_CENTER[1]);
        Mercator {
            scale: DEFAULT_SCALE,
            translate: Coord {
                x: DEFAULT_ORIGIN[0] - DEFAULT_SCALE * center.x,
                y: DEFAULT_ORIGIN[1] - DEFAULT_SCALE * center.y,
            },
        }
    }
}

impl Mercator {
    /// Largest projection that fits `rect` inside a `width` x `height` box,
    /// centered. `None` for a degenerate or non-finite extent.
    pub fn fit_size(width: f64, height: f64, rect: Rect<f64>) -> Option<Mercator> {
        let top_left = finite(raw(rect.min().x, rect.max().y))?;
        let bottom_right = finite(raw(rect.max().x, rect.min().y))?;
        let dx = bottom_right.x - top_left.x;
        let dy = bottom_right.y - top_left.y;
        let scale = match (dx > 0.0, dy > 0.0) {
            (true, true) => (width / dx).min(height / dy),
            (true, false) => width / dx,
            (false, true) => height / dy,
            (false, false) => return None,
        };
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }
        Some(Mercator {
            scale,
            translate: Coord {
                x: (width - scale * (top_left.x + bottom_right.x)) / 2.0,
                y: (height - scale * (top_left.y + bottom_right.y)) / 2.0,
            },
        })
    }

    /// Fit `rect` into a viewport less the margin, else the default view.
    pub fn fit_view(width: f64, height: f64, rect: Option<Rect<f64>>) -> Mercator {
        rect.and_then(|r| Mercator::fit_size(width - FIT_MARGIN, height - FIT_MARGIN, r))
            .unwrap_or_default()
    }

    /// `None` at or beyond the poles.
    pub fn project(&self, lonlat: Coord<f64>) -> Option<Coord<f64>> {
        if !(lonlat.y.abs() < 90.0) {
            return None;
        }
        let p = raw(lonlat.x, lonlat.y);
        finite(Coord {
            x: self.translate.x + self.scale * p.x,
            y: self.translate.y + self.scale * p.y,
        })
    }

    /// Project as lon/lat, then as lat/lon when that fails.
    pub fn project_safe(&self, coord: Coord<f64>) -> Option<Coord<f64>> {
        self.project(coord)
            .or_else(|| self.project(Coord { x: coord.y, y: coord.x }))
    }

    /// Projected pixel bounds of a geometry.
    pub fn bounds(&self, geometry: &Geometry<f64>) -> Option<Rect<f64>> {
        let rect = geometry.bounding_rect()?;
        let a = self.project(Coord { x: rect.min().x, y: rect.max().y })?;
        let b = self.project(Coord { x: rect.max().x, y: rect.min().y })?;
        Some(Rect::new(a, b))
    }

    /// Linear blend toward `to`; `t` is 0 at `self`, 1 at `to`.
    pub fn lerp(&self, to: &Mercator, t: f64) -> Mercator {
        Mercator {
            scale: self.scale + (to.scale - self.scale) * t,
            translate: Coord {
                x: self.translate.x + (to.translate.x - self.translate.x) * t,
                y: self.translate.y + (to.translate.y - self.translate.y) * t,
            },
        }
    }

    /// SVG path data for lines and polygons; points, and vertices that do
    /// not project, are skipped.
    pub fn path_d(&self, geometry: &Geometry<f64>) -> String {
        let mut d = String::new();
        self.write_geometry(&mut d, geometry);
        d
    }

    fn write_geometry(&self, d: &mut String, geometry: &Geometry<f64>) {
        match geometry {
            Geometry::LineString(ls) => self.write_line(d, ls, false),
            Geometry::MultiLineString(mls) => mls.iter().for_each(|ls| self.write_line(d, ls, false)),
            Geometry::Polygon(p) => {
                self.write_line(d, p.exterior(), true);
                p.interiors().iter().for_each(|r| self.write_line(d, r, true));
            }
            Geometry::MultiPolygon(mp) => mp.iter().for_each(|p| {
                self.write_line(d, p.exterior(), true);
                p.interiors().iter().for_each(|r| self.write_line(d, r, true));
            }),
            Geometry::Rect(r) => self.write_line(d, r.to_polygon().exterior(), true),
            Geometry::Triangle(t) => self.write_line(d, t.to_polygon().exterior(), true),
            Geometry::GeometryCollection(gc) => gc.iter().for_each(|g| self.write_geometry(d, g)),
            Geometry::Line(l) => self.write_line(d, &LineString::from(vec![l.start, l.end]), false),
            Geometry::Point(_) | Geometry::MultiPoint(_) => {}
        }
    }

    fn write_line(&self, d: &mut String, line: &LineString<f64>, closed: bool) {
        let mut first = true;
        for c in line.coords() {
            let Some(p) = self.project(*c) else {
                continue;
            };
            let cmd = if first { 'M' } else { 'L' };
            let _ = write!(d, "{}{:.2},{:.2}", cmd, p.x, p.y);
            first = false;
        }
        if closed && !first {
            d.push('Z');
        }
    }
}

/// Meridians and parallels every `step` degrees between latitudes -80 and 80.
pub fn graticule(step: f64) -> MultiLineString<f64> {
    let mut lines = Vec::new();
    if step <= 0.0 {
        return MultiLineString::new(lines);
    }
    let mut lon = -180.0;
    while lon <= 180.0 {
        lines.push(LineString::from(vec![(lon, -80.0), (lon, 80.0)]));
        lon += step;
    }
    let mut lat = -80.0;
    while lat <= 80.0 {
        lines.push(LineString::from(vec![(-180.0, lat), (180.0, lat)]));
        lat += step;
    }
    MultiLineString::new(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, polygon};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_default_places_center() {
        let p = Mercator::default().project(coord! { x: 108.0, y: 15.0 }).unwrap();
        assert!(close(p.x, 480.0));
        assert!(close(p.y, 250.0));
    }

    #[test]
    fn test_fit_size_centers_extent() {
        let rect = Rect::new(coord! { x: 102.0, y: 8.5 }, coord! { x: 109.5, y: 23.4 });
        let m = Mercator::fit_view(900.0, 600.0, Some(rect));
        let a = m.project(coord! { x: 102.0, y: 23.4 }).unwrap();
        let b = m.project(coord! { x: 109.5, y: 8.5 }).unwrap();
        // tall extent: height is the binding side
        assert!(close(a.y, 0.0));
        assert!(close(b.y, 580.0));
        assert!(close((a.x + b.x) / 2.0, 440.0));
    }

    #[test]
    fn test_degenerate_extent_falls_back() {
        let point = Rect::new(coord! { x: 105.0, y: 10.0 }, coord! { x: 105.0, y: 10.0 });
        assert_eq!(Mercator::fit_view(900.0, 600.0, Some(point)), Mercator::default());
        assert_eq!(Mercator::fit_view(900.0, 600.0, None), Mercator::default());
    }

    #[test]
    fn test_project_safe_swaps_order() {
        let m = Mercator::default();
        assert!(m.project(coord! { x: 10.0, y: 90.0 }).is_none());
        let swapped = m.project_safe(coord! { x: 10.0, y: 90.0 }).unwrap();
        assert_eq!(Some(swapped), m.project(coord! { x: 90.0, y: 10.0 }));
    }

    #[test]
    fn test_path_d_closes_rings() {
        let m = Mercator::default();
        let poly: Geometry<f64> = polygon![(x: 100.0, y: 10.0), (x: 101.0, y: 10.0), (x: 101.0, y: 11.0)].into();
        let d = m.path_d(&poly);
        assert!(d.starts_with('M'));
        assert!(d.ends_with('Z'));
        assert_eq!(d.matches('L').count(), 3);
        assert_eq!(graticule(5.0).0.len(), 73 + 33);
    }
}
