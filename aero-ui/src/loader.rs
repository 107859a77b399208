//! Fetching data and boundary files into core types.
//!
//! Every loader degrades to an empty or `None` result on failure; the
//! cause is logged by [`fetch_optional`].

use crate::js_bridge::fetch_optional;
use aero_core::catalog::{CountryOption, BASE_MAP_FILE, DAILY_CSV_FILES, DATA_DIR, GEO_DIR};
use aero_core::index::{PrioritizedSource, TimeSeriesIndex};
use aero_core::monthly::parse_monthly_csv;
use aero_core::region::{Region, RegionCollection};
use aero_core::resolver::{resolve_first, resolve_geojson, CandidateList};
use aero_data::daily::DailyTable;
use aero_data::series::MonthlySeries;
use futures::future::join_all;
use log::{info, warn};

/// Boundary files compiled into an app, keyed by file name.
pub type Bundle = &'static [(&'static str, &'static str)];

pub fn data_url(file: &str) -> String {
    format!("./{}/{}", DATA_DIR, file)
}

pub fn geo_url(file: &str) -> String {
    format!("./{}/{}", GEO_DIR, file)
}

fn bundled(bundle: Bundle) -> impl Fn(&str) -> Option<&'static str> {
    move |name| bundle.iter().find(|(file, _)| *file == name).map(|(_, text)| *text)
}

/// The bundled base map; an unreadable bundle yields an empty map.
pub fn load_base_map(bundle: Bundle) -> RegionCollection {
    let Some(text) = bundled(bundle)(BASE_MAP_FILE) else {
        warn!("{} is not bundled", BASE_MAP_FILE);
        return RegionCollection::default();
    };
    match RegionCollection::parse(text) {
        Ok(regions) => {
            info!("Base map has {} regions", regions.len());
            regions
        }
        Err(e) => {
            warn!("Failed to parse {}: {}", BASE_MAP_FILE, e);
            RegionCollection::default()
        }
    }
}

/// Fetch every daily CSV concurrently and merge once all have settled.
pub async fn load_index() -> TimeSeriesIndex {
    let bodies = join_all(DAILY_CSV_FILES.iter().map(|file| async move { fetch_optional(&data_url(file)).await })).await;
    TimeSeriesIndex::merge(PrioritizedSource::in_order(bodies.iter().map(Option::as_deref)))
}

/// Detail geometry of a region, from any of its identifiers.
pub async fn load_region_detail(region: &Region, bundle: Bundle) -> Option<RegionCollection> {
    let candidates = CandidateList::for_region(region);
    resolve_geojson(&candidates, bundled(bundle), |name| async move { fetch_optional(&geo_url(&name)).await })
        .await
        .map(|(_, regions)| regions)
}

/// Province layer of a region, looked up under its primary identifier.
pub async fn load_provinces(region: &Region, bundle: Bundle) -> Option<RegionCollection> {
    let candidates = CandidateList::for_identifier(region.primary_identifier()?);
    resolve_geojson(&candidates, bundled(bundle), |name| async move { fetch_optional(&geo_url(&name)).await })
        .await
        .map(|(_, regions)| regions)
}

/// AOD series of a chart option for a year.
pub async fn load_aod(option: &CountryOption, year: i32) -> MonthlySeries {
    let text = fetch_optional(&data_url(&option.aod_file(year))).await;
    MonthlySeries::from_records(&parse_monthly_csv(text.as_deref()), Some(year))
}

/// Monthly PM2.5 series of a chart option: the first candidate file that
/// loads wins.
pub async fn load_monthly_pm(option: &CountryOption, year: i32) -> MonthlySeries {
    let candidates = CandidateList::for_data_files(&option.monthly_files());
    let found = resolve_first(&candidates, |name| async move { fetch_optional(&data_url(&name)).await }).await;
    let text = found.map(|(_, text)| text);
    MonthlySeries::from_records(&parse_monthly_csv(text.as_deref()), Some(year))
}

/// Daily rows of one combined CSV.
pub async fn load_daily(file: &str) -> DailyTable {
    fetch_optional(&data_url(file))
        .await
        .map(|text| DailyTable::from_csv(&text))
        .unwrap_or_default()
}
