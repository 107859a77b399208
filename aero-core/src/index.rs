use crate::timestamp::{DateParts, Timestamp};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Value columns in priority order; the first one present in the header wins.
pub const VALUE_COLUMNS: [&str; 5] = ["PM2.5 (avg)", "PM2.5", "PM2.5 (Avg)", "Value", "value"];

/// A fetched CSV body tagged with its merge priority.
///
/// Sources merge in ascending priority; on a `(site, timestamp)` collision the
/// higher priority wins. `text` is `None` when the fetch failed.
#[derive(Debug, Clone)]
pub struct PrioritizedSource<'a> {
    pub priority: usize,
    pub text: Option<&'a str>,
}

impl<'a> PrioritizedSource<'a> {
    /// Tag bodies with their position in `bodies`, so later entries win.
    pub fn in_order(bodies: impl IntoIterator<Item = Option<&'a str>>) -> Vec<PrioritizedSource<'a>> {
        bodies
            .into_iter()
            .enumerate()
            .map(|(priority, text)| PrioritizedSource { priority, text })
            .collect()
    }
}

/// Column positions resolved once per file.
struct Columns {
    site: Option<usize>,
    year: Option<usize>,
    month: Option<usize>,
    day: Option<usize>,
    hour: Option<usize>,
    value: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Columns {
        let find = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| header.iter().position(|h| h.trim() == *name))
        };
        Columns {
            site: find(&["Site", "site"]),
            year: find(&["Year", "year"]),
            month: find(&["Month", "month"]),
            day: find(&["Day", "day"]),
            hour: find(&["Hour", "hour"]),
            value: find(&VALUE_COLUMNS),
        }
    }
}

fn cell(record: &StringRecord, idx: Option<usize>) -> &str {
    idx.and_then(|i| record.get(i)).unwrap_or("").trim()
}

/// Observations from every loaded source keyed by site and timestamp.
///
/// A `(site, timestamp)` pair holds at most one value; a `None` value means
/// the row existed but its measurement was empty or unparseable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesIndex {
    values: HashMap<String, BTreeMap<Timestamp, Option<f64>>>,
    timestamps: Vec<Timestamp>,
}

impl TimeSeriesIndex {
    /// Merge sources by ascending priority, regardless of the order given.
    pub fn merge(mut sources: Vec<PrioritizedSource<'_>>) -> TimeSeriesIndex {
        sources.sort_by_key(|s| s.priority);
        let mut index = TimeSeriesIndex::default();
        let mut stamps = BTreeSet::new();
        let mut loaded = 0usize;
        for source in &sources {
            let Some(text) = source.text else {
                continue;
            };
            loaded += 1;
            index.insert_csv(text, &mut stamps);
        }
        index.timestamps = stamps.into_iter().collect();
        info!(
            "Merged {} of {} sources: {} sites, {} timestamps",
            loaded,
            sources.len(),
            index.values.len(),
            index.timestamps.len()
        );
        index
    }

    /// Index a single CSV body.
    pub fn from_csv(text: &str) -> TimeSeriesIndex {
        TimeSeriesIndex::merge(vec![PrioritizedSource {
            priority: 0,
            text: Some(text),
        }])
    }

    fn insert_csv(&mut self, text: &str, stamps: &mut BTreeSet<Timestamp>) {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());
        let columns = match rdr.headers() {
            Ok(header) => Columns::from_header(header),
            Err(e) => {
                debug!("Skipping source with unreadable header: {}", e);
                return;
            }
        };

        for record in rdr.records().flatten() {
            let site = cell(&record, columns.site);
            let year = cell(&record, columns.year);
            if site.is_empty() || year.is_empty() {
                continue;
            }
            let Some(ts) = Timestamp::from_parts(
                year,
                cell(&record, columns.month),
                cell(&record, columns.day),
                cell(&record, columns.hour),
            ) else {
                debug!("Dropping row for {} with invalid date parts (year {})", site, year);
                continue;
            };
            let raw = cell(&record, columns.value);
            let value = if raw.is_empty() {
                None
            } else {
                raw.parse::<f64>().ok().filter(|v| v.is_finite())
            };
            self.values.entry(site.to_string()).or_default().insert(ts, value);
            stamps.insert(ts);
        }
    }

    /// Value for a site at a timestamp; `None` for both missing rows and null values.
    pub fn get(&self, site: &str, ts: &Timestamp) -> Option<f64> {
        self.values.get(site).and_then(|s| s.get(ts)).copied().flatten()
    }

    /// The site's rows in chronological order.
    pub fn series(&self, site: &str) -> impl Iterator<Item = (&Timestamp, &Option<f64>)> {
        self.values.get(site).into_iter().flat_map(|s| s.iter())
    }

    pub fn has_site(&self, site: &str) -> bool {
        self.values.contains_key(site)
    }

    /// Site names, sorted.
    pub fn sites(&self) -> Vec<&str> {
        let mut sites: Vec<&str> = self.values.keys().map(String::as_str).collect();
        sites.sort_unstable();
        sites
    }

    /// Every distinct timestamp across all sites, ascending.
    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn date_parts(&self) -> DateParts {
        DateParts::from_timestamps(&self.timestamps)
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.timestamps.last().map(Timestamp::year)
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    #[test]
    fn test_later_source_wins() {
        let a = "Site,Year,Month,Day,Hour,PM2.5\nHanoi,2020,1,1,0,10\n";
        let b = "Site,Year,Month,Day,Hour,PM2.5\nHanoi,2020,1,1,0,20\n";
        let index = TimeSeriesIndex::merge(PrioritizedSource::in_order([Some(a), Some(b)]));
        assert_eq!(index.get("Hanoi", &ts("2020-01-01T00:00:00")), Some(20.0));
        assert_eq!(index.timestamps().len(), 1);
    }

    #[test]
    fn test_priority_not_arrival_order() {
        let a = "Site,Year,PM2.5\nHanoi,2020,10\n";
        let b = "Site,Year,PM2.5\nHanoi,2020,20\n";
        let sources = vec![
            PrioritizedSource { priority: 1, text: Some(b) },
            PrioritizedSource { priority: 0, text: Some(a) },
        ];
        let index = TimeSeriesIndex::merge(sources);
        assert_eq!(index.get("Hanoi", &ts("2020-01-01T00:00:00")), Some(20.0));
    }

    #[test]
    fn test_failed_sources_are_skipped() {
        let a = "site,year,month,day,value\nManila,2021,2,3,7.5\n";
        let index = TimeSeriesIndex::merge(PrioritizedSource::in_order([None, Some(a), None]));
        assert_eq!(index.get("Manila", &ts("2021-02-03T00:00:00")), Some(7.5));
        assert!(TimeSeriesIndex::merge(PrioritizedSource::in_order([None])).is_empty());
    }

    #[test]
    fn test_value_column_priority() {
        let text = "Site,Year,Value,PM2.5 (avg)\nHanoi,2021,1,2\nHanoi,2022,1,\n";
        let index = TimeSeriesIndex::from_csv(text);
        assert_eq!(index.get("Hanoi", &ts("2021-01-01T00:00:00")), Some(2.0));
        // present-but-empty preferred column yields null, not the fallback column
        assert_eq!(index.get("Hanoi", &ts("2022-01-01T00:00:00")), None);
        assert_eq!(index.series("Hanoi").count(), 2);
    }

    #[test]
    fn test_rows_without_site_or_year_are_skipped() {
        let text = "Site,Year,Month,PM2.5\n,2021,1,5\nHanoi,,1,5\nHanoi,2021,13,5\n Hanoi ,2021,2,abc\n";
        let index = TimeSeriesIndex::from_csv(text);
        assert_eq!(index.sites(), vec!["Hanoi"]);
        assert_eq!(index.timestamps(), &[ts("2021-02-01T00:00:00")]);
        assert!(index.has_site("Hanoi"));
        assert_eq!(index.get("Hanoi", &ts("2021-02-01T00:00:00")), None);
    }

    #[test]
    fn test_date_parts_and_latest_year() {
        let text = "Site,Year,Month,Day,PM2.5\nHanoi,2020,12,31,1\nJakarta Central,2021,3,15,2\n";
        let index = TimeSeriesIndex::from_csv(text);
        assert_eq!(index.latest_year(), Some(2021));
        let parts = index.date_parts();
        assert_eq!(parts.years, vec![2020, 2021]);
        assert_eq!(index.sites(), vec!["Hanoi", "Jakarta Central"]);
    }
}
