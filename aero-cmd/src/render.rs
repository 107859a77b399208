//! Rendering map and chart snapshots to standalone SVG files.

use crate::files::read_text;
use aero_core::index::{PrioritizedSource, TimeSeriesIndex};
use aero_core::monthly::parse_monthly_csv;
use aero_core::region::RegionCollection;
use aero_core::resolver::{resolve_geojson, CandidateList};
use aero_core::selection::Selection;
use aero_core::timestamp::YearMonth;
use aero_data::aggregate::aggregate_for_region;
use aero_data::series::{MonthlySeries, SeriesMode};
use aero_render::chart::{ChartScene, CHART_HEIGHT, CHART_WIDTH};
use aero_render::map::{MapLayers, MapScene, MAP_HEIGHT, MAP_WIDTH};
use aero_utils::compression::{decode_text, is_gzip_name};
use aero_utils::dates::parse_date;
use anyhow::{anyhow, bail, Context};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What to draw on the map.
#[derive(Debug, Clone)]
pub struct MapRequest {
    /// Daily combined CSVs, lowest merge priority first
    pub data: Vec<PathBuf>,
    pub base: PathBuf,
    pub geo_dir: PathBuf,
    pub remote: Option<String>,
    pub region: Option<String>,
    pub year: Option<i32>,
    /// YYYY-MM
    pub month: Option<String>,
    /// YYYY-MM-DD
    pub day: Option<String>,
    pub slot: usize,
    pub time: Option<usize>,
}

/// Boundary files from a local directory, falling back to a remote host.
struct GeoSource {
    dir: PathBuf,
    remote: Option<String>,
    client: reqwest::Client,
}

impl GeoSource {
    fn new(dir: PathBuf, remote: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(GeoSource { dir, remote, client })
    }

    async fn fetch(&self, name: &str) -> Option<String> {
        let local = self.dir.join(name);
        if local.is_file() {
            match read_text(&local) {
                Ok(text) => return Some(text),
                Err(e) => warn!("{:#}", e),
            }
        }
        let base = self.remote.as_deref()?;
        let url = format!("{}/{}", base.trim_end_matches('/'), name);
        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                return None;
            }
        };
        if !response.status().is_success() {
            debug!("{} returned {}", url, response.status());
            return None;
        }
        let bytes = response.bytes().await.ok()?;
        decode_text(&bytes, is_gzip_name(name))
            .map_err(|e| warn!("Failed to decode {}: {:#}", url, e))
            .ok()
    }

    /// First candidate that loads and parses as GeoJSON. Nothing is bundled
    /// here, so every candidate goes through [`GeoSource::fetch`].
    async fn resolve(&self, candidates: &CandidateList) -> Option<RegionCollection> {
        let (name, regions) =
            resolve_geojson(candidates, |_: &str| None, |name| async move { self.fetch(&name).await }).await?;
        info!("Loaded {} ({} features)", name, regions.len());
        Some(regions)
    }
}

fn load_index(paths: &[PathBuf]) -> TimeSeriesIndex {
    let bodies: Vec<Option<String>> = paths
        .iter()
        .map(|path| {
            read_text(path)
                .map_err(|e| warn!("Skipping data file: {:#}", e))
                .ok()
        })
        .collect();
    TimeSeriesIndex::merge(PrioritizedSource::in_order(bodies.iter().map(Option::as_deref)))
}

/// Apply the requested region and dates in cascade order.
fn build_selection(request: &MapRequest, base: &RegionCollection, index: &TimeSeriesIndex) -> anyhow::Result<Selection> {
    let mut selection = Selection::new();
    let stamps = index.timestamps().len();
    selection.set_time_index(request.time.unwrap_or(stamps.saturating_sub(1)), stamps);

    let Some(name) = &request.region else {
        return Ok(selection);
    };
    let position = base
        .position_by_name(name)
        .ok_or_else(|| anyhow!("Region {} is not in the base map", name))?;
    selection.toggle_region(position);

    if request.year.is_some() {
        selection.select_year(request.year);
    }
    if let Some(month) = &request.month {
        let ym: YearMonth = month.parse().with_context(|| format!("Invalid month {}", month))?;
        selection.select_month(Some(ym));
    }
    if let Some(day) = &request.day {
        selection.select_day(Some(parse_date(day)?));
    }

    if let Some(region) = base.get(position) {
        let slots = aggregate_for_region(index, region, selection.granularity(), &selection.window())
            .map(|series| series.values.len())
            .unwrap_or(0);
        selection.set_active_index(request.slot, slots);
    }
    Ok(selection)
}

pub async fn run_render_map(request: &MapRequest, output: &Path) -> anyhow::Result<()> {
    let base = RegionCollection::parse(&read_text(&request.base)?)
        .with_context(|| format!("Failed to parse base map {}", request.base.display()))?;
    let index = load_index(&request.data);
    if index.is_empty() {
        warn!("No observations loaded; the map will have no values");
    }
    let selection = build_selection(request, &base, &index)?;

    let mut detail = None;
    let mut provinces = None;
    if let Some(region) = selection.region().and_then(|i| base.get(i)) {
        let source = GeoSource::new(request.geo_dir.clone(), request.remote.clone())?;
        detail = source.resolve(&CandidateList::for_region(region)).await;
        if let Some(id) = region.primary_identifier() {
            provinces = source.resolve(&CandidateList::for_identifier(id)).await;
        }
    }

    let layers = MapLayers {
        base: &base,
        detail: detail.as_ref(),
        provinces: provinces.as_ref(),
    };
    let projection = layers.target_projection(&selection, MAP_WIDTH, MAP_HEIGHT);
    let scene = MapScene::build(&layers, &index, &selection, &projection, MAP_WIDTH, MAP_HEIGHT);
    std::fs::write(output, scene.to_svg()).with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        "Wrote map with {} regions and {} city markers to {}",
        scene.regions.len(),
        scene.cities.len(),
        output.display()
    );
    Ok(())
}

fn load_series(path: Option<&Path>, year: Option<i32>) -> anyhow::Result<MonthlySeries> {
    let Some(path) = path else {
        return Ok(MonthlySeries::default());
    };
    let text = read_text(path)?;
    Ok(MonthlySeries::from_records(&parse_monthly_csv(Some(&text)), year))
}

pub fn run_render_chart(
    aod: Option<&Path>,
    pm: Option<&Path>,
    year: Option<i32>,
    mode: SeriesMode,
    output: &Path,
) -> anyhow::Result<()> {
    if aod.is_none() && pm.is_none() {
        bail!("Pass --aod, --pm or both");
    }
    let aod = load_series(aod, year)?;
    let pm = load_series(pm, year)?;
    let Some(scene) = ChartScene::build(&aod, &pm, mode, CHART_WIDTH, CHART_HEIGHT) else {
        bail!("No chart data");
    };
    std::fs::write(output, scene.to_svg()).with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote {} chart to {}", mode.as_str(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::tests::scratch_dir;
    use std::fs;

    const BASE: &str = r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "properties": {"name": "Vietnam", "adm0_a3": "VNM", "iso_a2": "VN", "label_x": 105.4, "label_y": 21.7},
          "geometry": {"type": "Polygon", "coordinates": [[[102.0, 8.5], [109.5, 8.5], [109.5, 23.4], [102.0, 23.4], [102.0, 8.5]]]}
        },
        {
          "type": "Feature",
          "properties": {"name": "Laos", "adm0_a3": "LAO", "iso_a2": "LA"},
          "geometry": {"type": "Polygon", "coordinates": [[[100.1, 13.9], [107.6, 13.9], [107.6, 22.5], [100.1, 22.5], [100.1, 13.9]]]}
        }
      ]
    }"#;

    const DAILY: &str = "Site,Year,Month,Day,PM2.5 (avg)\n\
        Hanoi,2021,1,1,40\n\
        Hanoi,2021,1,2,60\n\
        Hanoi,2021,2,1,30\n\
        Vietnam,2021,2,1,55\n";

    fn request(dir: &Path) -> MapRequest {
        MapRequest {
            data: vec![dir.join("daily.csv")],
            base: dir.join("base.json"),
            geo_dir: dir.to_path_buf(),
            remote: None,
            region: None,
            year: None,
            month: None,
            day: None,
            slot: 0,
            time: None,
        }
    }

    #[tokio::test]
    async fn test_render_overview_map() {
        let dir = scratch_dir("overview");
        fs::write(dir.join("base.json"), BASE).unwrap();
        fs::write(dir.join("daily.csv"), DAILY).unwrap();
        let output = dir.join("map.svg");

        run_render_map(&request(&dir), &output).await.unwrap();
        let svg = fs::read_to_string(&output).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        // latest timestamp is shown in overview
        assert!(svg.contains("2021-02-01"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_render_drilled_map_with_local_detail() {
        let dir = scratch_dir("drilled");
        fs::write(dir.join("base.json"), BASE).unwrap();
        fs::write(dir.join("daily.csv"), DAILY).unwrap();
        fs::write(dir.join("VNM.json"), BASE).unwrap();
        let output = dir.join("map.svg");

        let mut req = request(&dir);
        req.region = Some("vietnam".to_string());
        req.year = Some(2021);
        req.slot = 7;
        run_render_map(&req, &output).await.unwrap();
        let svg = fs::read_to_string(&output).unwrap();
        assert!(svg.contains("Hanoi"));

        req.region = Some("Atlantis".to_string());
        assert!(run_render_map(&req, &output).await.is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_geo_source_skips_unparseable_candidates() {
        let dir = scratch_dir("geosource");
        fs::write(dir.join("VNM.geojson"), "<html>not found</html>").unwrap();
        fs::write(dir.join("vnm.json"), BASE).unwrap();
        let source = GeoSource::new(dir.clone(), None).unwrap();

        let regions = source.resolve(&CandidateList::for_identifier("VNM")).await.unwrap();
        assert_eq!(regions.len(), 2);
        // no local file and no remote host
        assert!(source.resolve(&CandidateList::for_identifier("LAO")).await.is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_selection_cascade_and_slot_clamp() {
        let dir = scratch_dir("selection");
        fs::write(dir.join("daily.csv"), DAILY).unwrap();
        let base = RegionCollection::parse(BASE).unwrap();
        let index = load_index(&[dir.join("daily.csv"), dir.join("missing.csv")]);

        let mut req = request(&dir);
        req.region = Some("Vietnam".to_string());
        req.month = Some("2021-01".to_string());
        req.slot = 10;
        let selection = build_selection(&req, &base, &index).unwrap();
        assert_eq!(selection.region(), Some(0));
        assert_eq!(selection.year(), Some(2021));
        // January has two days of data
        assert_eq!(selection.period_index(), 1);

        req.month = Some("2021-13".to_string());
        assert!(build_selection(&req, &base, &index).is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_render_chart() {
        let dir = scratch_dir("chart");
        fs::write(dir.join("aod.csv"), "Month,PM2.5\nJanuary,0.8\nFebruary,1.9\nMarch,0.4\n").unwrap();
        let output = dir.join("chart.svg");

        run_render_chart(Some(&dir.join("aod.csv")), None, None, SeriesMode::Aod, &output).unwrap();
        let svg = fs::read_to_string(&output).unwrap();
        assert!(svg.contains("<path"));

        assert!(run_render_chart(None, None, None, SeriesMode::Both, &output).is_err());
        fs::write(dir.join("empty.csv"), "Month,PM2.5\n").unwrap();
        assert!(run_render_chart(Some(&dir.join("empty.csv")), None, None, SeriesMode::Both, &output).is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
