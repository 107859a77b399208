//! Locating boundary and data files whose names follow loose conventions.
//!
//! A [`CandidateList`] expands identifiers into the file names a dataset
//! might use; [`resolve_first`] tries them in order against any loader.

use crate::catalog::country_key;
use crate::region::{Region, RegionCollection};
use aero_utils::names::compact_name;
use log::{debug, warn};
use std::collections::HashSet;
use std::future::Future;

/// Ordered, duplicate-free file names to try.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateList {
    names: Vec<String>,
}

impl CandidateList {
    fn push(&mut self, seen: &mut HashSet<String>, name: String) {
        if !name.is_empty() && seen.insert(name.clone()) {
            self.names.push(name);
        }
    }

    fn push_variants(&mut self, seen: &mut HashSet<String>, identifier: &str) {
        let root = identifier.trim();
        if root.is_empty() {
            return;
        }
        let lower = root.to_lowercase();
        let stem = strip_extension(root);
        let lower_stem = strip_extension(&lower);
        let compact = compact_name(lower_stem);

        self.push(seen, root.to_string());
        self.push(seen, lower.clone());
        self.push(seen, format!("{}.geojson", stem));
        self.push(seen, format!("{}.json", stem));
        self.push(seen, format!("{}.geojson", lower_stem));
        self.push(seen, format!("{}.json", lower_stem));
        if !compact.is_empty() {
            self.push(seen, format!("{}.geojson", compact));
            self.push(seen, format!("{}.json", compact));
        }
    }

    /// Variants of one identifier: as given, lowercased, with `.geojson` and
    /// `.json` extensions, and lowercased with separators removed.
    pub fn for_identifier(identifier: &str) -> CandidateList {
        let mut list = CandidateList::default();
        let mut seen = HashSet::new();
        list.push_variants(&mut seen, identifier);
        list
    }

    /// Variants of every identifier a region carries, most specific first:
    /// `filename`, `adm0_a3`, `iso_a2`, `name`, the name without spaces, and
    /// the country key derived from its codes.
    pub fn for_region(region: &Region) -> CandidateList {
        let mut list = CandidateList::default();
        let mut seen = HashSet::new();
        let squashed: String = region
            .name
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        let identifiers = [
            region.filename.as_deref(),
            region.adm0_a3.as_deref(),
            region.iso_a2.as_deref(),
            Some(region.name.as_str()),
            Some(squashed.as_str()),
            country_key(region),
        ];
        for id in identifiers.into_iter().flatten() {
            list.push_variants(&mut seen, id);
        }
        list
    }

    /// Data-file variants: as given, lowercased, spaces as `_`, spaces removed.
    pub fn for_data_files<S: AsRef<str>>(files: &[S]) -> CandidateList {
        let mut list = CandidateList::default();
        let mut seen = HashSet::new();
        for file in files {
            let file = file.as_ref().trim();
            list.push(&mut seen, file.to_string());
            list.push(&mut seen, file.to_lowercase());
            list.push(&mut seen, file.split_whitespace().collect::<Vec<_>>().join("_"));
            list.push(&mut seen, file.split_whitespace().collect::<String>());
        }
        list
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn strip_extension(name: &str) -> &str {
    let lower = name.to_ascii_lowercase();
    for ext in [".geojson", ".json"] {
        if lower.ends_with(ext) {
            return &name[..name.len() - ext.len()];
        }
    }
    name
}

/// Try each candidate in order; the first loader result that is `Some` wins.
///
/// Returns the winning name with the loaded value. Exhausting the list is a
/// normal outcome, not an error.
pub async fn resolve_first<T, F, Fut>(candidates: &CandidateList, mut load: F) -> Option<(String, T)>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for name in candidates.iter() {
        if let Some(value) = load(name.to_string()).await {
            debug!("Resolved candidate {}", name);
            return Some((name.to_string(), value));
        }
    }
    debug!("No candidate of {} resolved", candidates.len());
    None
}

/// Resolve a boundary file: each candidate is looked up among the bundled
/// assets first, then fetched remotely. A candidate that loads but does not
/// parse as GeoJSON counts as a miss.
pub async fn resolve_geojson<B, R, Fut>(
    candidates: &CandidateList,
    bundled: B,
    mut remote: R,
) -> Option<(String, RegionCollection)>
where
    B: Fn(&str) -> Option<&'static str>,
    R: FnMut(String) -> Fut,
    Fut: Future<Output = Option<String>>,
{
    let found = resolve_first(candidates, |name| {
        let local = bundled(&name).map(str::to_string);
        let fetch = if local.is_none() { Some(remote(name.clone())) } else { None };
        async move {
            let text = match (local, fetch) {
                (Some(text), _) => text,
                (None, Some(fetch)) => fetch.await?,
                (None, None) => return None,
            };
            match RegionCollection::parse(&text) {
                Ok(regions) => Some(regions),
                Err(e) => {
                    debug!("Candidate {} is not usable GeoJSON: {}", name, e);
                    None
                }
            }
        }
    })
    .await;
    if found.is_none() {
        warn!("No boundary file found among {} candidates", candidates.len());
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::tests::SEA_SAMPLE;
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[test]
    fn test_identifier_variants() {
        let list = CandidateList::for_identifier("Ho Chi_Minh.JSON");
        let names: Vec<&str> = list.iter().collect();
        assert_eq!(
            names,
            vec![
                "Ho Chi_Minh.JSON",
                "ho chi_minh.json",
                "Ho Chi_Minh.geojson",
                "Ho Chi_Minh.json",
                "ho chi_minh.geojson",
                "hochiminh.geojson",
                "hochiminh.json",
            ]
        );
    }

    #[test]
    fn test_identifier_deduplicates() {
        let list = CandidateList::for_identifier("vnm");
        let names: Vec<&str> = list.iter().collect();
        assert_eq!(names, vec!["vnm", "vnm.geojson", "vnm.json"]);
        assert!(CandidateList::for_identifier("  ").is_empty());
    }

    #[test]
    fn test_region_candidates_order() {
        let regions = RegionCollection::parse(SEA_SAMPLE).unwrap();
        let list = CandidateList::for_region(regions.get(0).unwrap());
        let names: Vec<&str> = list.iter().collect();
        assert_eq!(&names[..4], &["VNM", "vnm", "VNM.geojson", "VNM.json"]);
        assert!(names.contains(&"vietnam.json"));
        let vn_pos = names.iter().position(|n| *n == "VN").unwrap();
        let name_pos = names.iter().position(|n| *n == "Vietnam").unwrap();
        assert!(vn_pos < name_pos);
    }

    #[test]
    fn test_data_file_variants() {
        let list = CandidateList::for_data_files(&["Ho Chi Minh_monthly.csv"]);
        let names: Vec<&str> = list.iter().collect();
        assert_eq!(
            names,
            vec![
                "Ho Chi Minh_monthly.csv",
                "ho chi minh_monthly.csv",
                "Ho_Chi_Minh_monthly.csv",
                "HoChiMinh_monthly.csv",
            ]
        );
    }

    #[test]
    fn test_resolve_first_stops_at_first_hit() {
        let list = CandidateList::for_identifier("vnm");
        let tried = RefCell::new(Vec::new());
        let found = block_on(resolve_first(&list, |name| {
            tried.borrow_mut().push(name.clone());
            async move { (name == "vnm.geojson").then_some(42) }
        }));
        assert_eq!(found, Some(("vnm.geojson".to_string(), 42)));
        assert_eq!(tried.borrow().len(), 2);
    }

    #[test]
    fn test_resolve_first_miss_is_none() {
        let list = CandidateList::for_identifier("atlantis");
        let found: Option<(String, ())> = block_on(resolve_first(&list, |_| async { None }));
        assert!(found.is_none());
    }

    #[test]
    fn test_resolve_geojson_bundled_then_remote() {
        let list = CandidateList::for_identifier("vnm");
        let remote_calls = RefCell::new(Vec::new());
        let found = block_on(resolve_geojson(
            &list,
            |name| (name == "vnm.json").then_some(SEA_SAMPLE),
            |name| {
                remote_calls.borrow_mut().push(name.clone());
                async move {
                    // remote has an unparseable file under the first name
                    (name == "vnm").then(|| "<html>not found</html>".to_string())
                }
            },
        ));
        let (name, regions) = found.unwrap();
        assert_eq!(name, "vnm.json");
        assert_eq!(regions.len(), 3);
        assert_eq!(*remote_calls.borrow(), vec!["vnm".to_string(), "vnm.geojson".to_string()]);
    }
}
