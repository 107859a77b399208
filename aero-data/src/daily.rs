//! Daily readings with their reported AQI category, for the time-lapse view.

use crate::category::AqiCategory;
use aero_utils::dates::SeasonPeriod;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use log::debug;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct DailyReading {
    pub site: String,
    pub date: NaiveDate,
    pub pm25: Option<f64>,
    /// `AQI Category` cell, else derived from the concentration
    pub category: Option<AqiCategory>,
}

/// Rows of a daily combined CSV (`Site`, `Year`, `Month`, `Day`,
/// `PM2.5 (avg)`, `AQI Category`), sorted by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyTable {
    rows: Vec<DailyReading>,
    dates: Vec<NaiveDate>,
}

impl DailyTable {
    pub fn from_csv(text: &str) -> DailyTable {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.trim_start_matches('\u{feff}').as_bytes());
        let header = match rdr.headers() {
            Ok(h) => h.clone(),
            Err(e) => {
                debug!("Daily CSV has no readable header: {}", e);
                return DailyTable::default();
            }
        };
        let col = |name: &str| header.iter().position(|h| h.trim() == name);
        let (site, year, month, day) = (col("Site"), col("Year"), col("Month"), col("Day"));
        let pm = col("PM2.5 (avg)").or_else(|| col("PM2.5"));
        let category = col("AQI Category");

        let mut rows = Vec::new();
        for record in rdr.records().flatten() {
            let get = |i: Option<usize>| i.and_then(|i| record.get(i)).unwrap_or("").trim();
            let site = get(site);
            if site.is_empty() {
                continue;
            }
            let date = match (get(year).parse(), get(month).parse(), get(day).parse()) {
                (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d),
                _ => None,
            };
            let Some(date) = date else {
                debug!("Dropping daily row for {} with invalid date", site);
                continue;
            };
            let pm25 = get(pm).parse::<f64>().ok().filter(|v| v.is_finite());
            let category = AqiCategory::parse(get(category)).or_else(|| pm25.map(AqiCategory::from_pm25));
            rows.push(DailyReading {
                site: site.to_string(),
                date,
                pm25,
                category,
            });
        }
        rows.sort_by_key(|r| r.date);
        let dates = rows.iter().map(|r| r.date).collect::<BTreeSet<_>>().into_iter().collect();
        DailyTable { rows, dates }
    }

    /// Keep only rows of the given sites.
    pub fn retain_sites(&mut self, sites: &[&str]) {
        self.rows.retain(|r| sites.contains(&r.site.as_str()));
        self.dates = self.rows.iter().map(|r| r.date).collect::<BTreeSet<_>>().into_iter().collect();
    }

    /// Distinct dates, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn on(&self, date: NaiveDate) -> impl Iterator<Item = &DailyReading> {
        self.rows.iter().filter(move |r| r.date == date)
    }

    /// The site's readings in the same seasonal window as `date`, across
    /// every year present.
    pub fn period_series(&self, site: &str, date: NaiveDate) -> Vec<&DailyReading> {
        let period = SeasonPeriod::for_date(&date);
        self.rows
            .iter()
            .filter(|r| r.site == site && SeasonPeriod::for_date(&r.date) == period)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAILY: &str = "Site,Year,Month,Day,PM2.5 (avg),AQI Category\n\
        Ho Chi Minh City,2023,3,2,40.5,Unhealthy for Sensitive Groups\n\
        Ho Chi Minh City,2023,3,1,20,\n\
        Hanoi,2023,3,1,70,Unhealthy\n\
        Ho Chi Minh City,2023,8,20,10,Good\n\
        Ho Chi Minh City,2023,2,30,10,Good\n";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_and_sort() {
        let table = DailyTable::from_csv(DAILY);
        assert_eq!(table.dates(), &[date(2023, 3, 1), date(2023, 3, 2), date(2023, 8, 20)]);
        let first: Vec<_> = table.on(date(2023, 3, 1)).collect();
        assert_eq!(first.len(), 2);
        // missing category falls back to the concentration
        let hcm = first.iter().find(|r| r.site == "Ho Chi Minh City").unwrap();
        assert_eq!(hcm.category, Some(AqiCategory::Moderate));
    }

    #[test]
    fn test_period_series_and_filter() {
        let mut table = DailyTable::from_csv(DAILY);
        let spring = table.period_series("Ho Chi Minh City", date(2023, 4, 10));
        assert_eq!(spring.len(), 2);
        assert!(spring[1].category.unwrap().is_unhealthy());

        table.retain_sites(&["Hanoi"]);
        assert_eq!(table.dates(), &[date(2023, 3, 1)]);
    }
}
