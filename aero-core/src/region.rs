use crate::error::{AeroError, Result};
use aero_utils::names::normalize_name;
use geo::{BoundingRect, Centroid, Coord, Geometry, Rect};
use geojson::{Feature, GeoJson, JsonValue};
use log::debug;

/// A country or province boundary with its identifying properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// `name`, else `admin`, else empty
    pub name: String,
    pub admin: Option<String>,
    pub adm0_a3: Option<String>,
    pub iso_a2: Option<String>,
    /// Hint for the detail-geometry file name
    pub filename: Option<String>,
    /// Preferred label point (`label_x`, `label_y`) in lon/lat
    pub label: Option<Coord<f64>>,
    pub geometry: Option<Geometry<f64>>,
}

fn string_property(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        JsonValue::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number_property(feature: &Feature, key: &str) -> Option<f64> {
    let value = match feature.property(key)? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

impl Region {
    pub fn from_feature(feature: Feature) -> Region {
        let admin = string_property(&feature, "admin");
        let name = string_property(&feature, "name")
            .or_else(|| admin.clone())
            .unwrap_or_default();
        let label = match (
            number_property(&feature, "label_x"),
            number_property(&feature, "label_y"),
        ) {
            (Some(x), Some(y)) => Some(Coord { x, y }),
            _ => None,
        };
        let adm0_a3 = string_property(&feature, "adm0_a3");
        let iso_a2 = string_property(&feature, "iso_a2");
        let filename = string_property(&feature, "filename");
        let geometry = feature.geometry.and_then(|g| {
            let converted: std::result::Result<Geometry<f64>, _> = g.try_into();
            converted
                .map_err(|e| debug!("Unsupported geometry on feature {}: {}", name, e))
                .ok()
        });
        Region {
            name,
            admin,
            adm0_a3,
            iso_a2,
            filename,
            label,
            geometry,
        }
    }

    /// Planar centroid of the boundary.
    pub fn centroid(&self) -> Option<Coord<f64>> {
        self.geometry.as_ref()?.centroid().map(|p| p.0)
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.geometry.as_ref()?.bounding_rect()
    }

    /// Label point if present, else the centroid.
    pub fn anchor(&self) -> Option<Coord<f64>> {
        self.label.or_else(|| self.centroid())
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// First of `filename`, `adm0_a3`, `iso_a2` and `name` that is set;
    /// province layers are looked up under this one identifier.
    pub fn primary_identifier(&self) -> Option<&str> {
        [self.filename.as_deref(), self.adm0_a3.as_deref(), self.iso_a2.as_deref()]
            .into_iter()
            .flatten()
            .next()
            .or_else(|| (!self.name.is_empty()).then_some(self.name.as_str()))
    }
}

/// An ordered set of regions parsed from one GeoJSON document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionCollection {
    pub regions: Vec<Region>,
}

impl RegionCollection {
    /// Parse a FeatureCollection, a single Feature or a bare Geometry.
    ///
    /// A document with no features is an error so resolvers treat it as a miss.
    pub fn parse(text: &str) -> Result<RegionCollection> {
        let geojson: GeoJson = text.parse()?;
        let regions: Vec<Region> = match geojson {
            GeoJson::FeatureCollection(fc) => fc.features.into_iter().map(Region::from_feature).collect(),
            GeoJson::Feature(f) => vec![Region::from_feature(f)],
            GeoJson::Geometry(g) => vec![Region::from_feature(Feature {
                bbox: None,
                geometry: Some(g),
                id: None,
                properties: None,
                foreign_members: None,
            })],
        };
        if regions.is_empty() {
            return Err(AeroError::EmptyGeoJson);
        }
        Ok(RegionCollection { regions })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    /// Union of every region's lon/lat bounds.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.regions
            .iter()
            .filter_map(Region::bounding_rect)
            .reduce(|a, b| {
                Rect::new(
                    Coord {
                        x: a.min().x.min(b.min().x),
                        y: a.min().y.min(b.min().y),
                    },
                    Coord {
                        x: a.max().x.max(b.max().x),
                        y: a.max().y.max(b.max().y),
                    },
                )
            })
    }

    /// Index of the region whose name or admin matches exactly (case-insensitive).
    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.regions.iter().position(|r| {
            r.name.eq_ignore_ascii_case(name)
                || r.admin.as_deref().is_some_and(|a| a.eq_ignore_ascii_case(name))
        })
    }

    /// First region whose normalized name contains the normalized fragment.
    pub fn find_containing(&self, fragment: &str) -> Option<&Region> {
        let fragment = normalize_name(fragment);
        if fragment.is_empty() {
            return None;
        }
        self.regions.iter().find(|r| r.normalized_name().contains(&fragment))
    }

    /// Coordinate for a place name: exact name/admin match first, then a
    /// normalized substring match; label point preferred over centroid.
    pub fn find_coord_by_name(&self, name: &str) -> Option<Coord<f64>> {
        if let Some(region) = self.position_by_name(name).and_then(|i| self.get(i)) {
            if let Some(anchor) = region.anchor() {
                return Some(anchor);
            }
        }
        self.find_containing(name).and_then(Region::anchor)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SEA_SAMPLE: &str = r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "properties": {"name": "Vietnam", "admin": "Vietnam", "adm0_a3": "VNM", "iso_a2": "VN", "label_x": 105.387292, "label_y": 21.715416},
          "geometry": {"type": "Polygon", "coordinates": [[[102.0, 8.5], [109.5, 8.5], [109.5, 23.4], [102.0, 23.4], [102.0, 8.5]]]}
        },
        {
          "type": "Feature",
          "properties": {"admin": "Philippines", "adm0_a3": "PHL", "iso_a2": "PH"},
          "geometry": {"type": "MultiPolygon", "coordinates": [[[[117.0, 5.0], [126.6, 5.0], [126.6, 18.5], [117.0, 18.5], [117.0, 5.0]]]]}
        },
        {
          "type": "Feature",
          "properties": {"name": "Lao PDR", "adm0_a3": "LAO", "iso_a2": "LA", "label_x": "102.5", "label_y": "19.4"},
          "geometry": null
        }
      ]
    }"#;

    #[test]
    fn test_parse_feature_collection() {
        let regions = RegionCollection::parse(SEA_SAMPLE).unwrap();
        assert_eq!(regions.len(), 3);
        let vn = regions.get(0).unwrap();
        assert_eq!(vn.name, "Vietnam");
        assert_eq!(vn.adm0_a3.as_deref(), Some("VNM"));
        assert!(vn.geometry.is_some());
        // name falls back to admin
        assert_eq!(regions.get(1).unwrap().name, "Philippines");
        // string label coordinates are accepted
        let laos = regions.get(2).unwrap();
        assert_eq!(laos.label, Some(Coord { x: 102.5, y: 19.4 }));
        assert!(laos.geometry.is_none());
        assert_eq!(vn.primary_identifier(), Some("VNM"));
    }

    #[test]
    fn test_bounds_and_centroid() {
        let regions = RegionCollection::parse(SEA_SAMPLE).unwrap();
        let rect = regions.bounding_rect().unwrap();
        assert_eq!(rect.min(), Coord { x: 102.0, y: 5.0 });
        assert_eq!(rect.max(), Coord { x: 126.6, y: 23.4 });
        let c = regions.get(0).unwrap().centroid().unwrap();
        assert!((c.x - 105.75).abs() < 1e-9);
        assert!((c.y - 15.95).abs() < 1e-9);
    }

    #[test]
    fn test_find_coord_by_name() {
        let regions = RegionCollection::parse(SEA_SAMPLE).unwrap();
        let vn = regions.find_coord_by_name("vietnam").unwrap();
        assert_eq!(vn, Coord { x: 105.387292, y: 21.715416 });
        // no label point: centroid
        let ph = regions.find_coord_by_name("Philippines").unwrap();
        assert!((ph.x - 121.8).abs() < 1e-9);
        // substring match on normalized names
        assert!(regions.find_coord_by_name("Lao").is_some());
        assert!(regions.find_coord_by_name("Atlantis").is_none());
    }

    #[test]
    fn test_parse_errors() {
        assert!(RegionCollection::parse("not json").is_err());
        assert!(matches!(
            RegionCollection::parse(r#"{"type":"FeatureCollection","features":[]}"#),
            Err(AeroError::EmptyGeoJson)
        ));
        let single = r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}"#;
        assert_eq!(RegionCollection::parse(single).unwrap().len(), 1);
    }
}
