//! Compile-time catalog of monitored cities, country codes and data file names.

use crate::region::Region;
use aero_utils::names::normalize_name;
use geo::Coord;

/// Bundled base map of the region, resolved like any other boundary file.
pub const BASE_MAP_FILE: &str = "SEA_Map.json";

/// Directory (relative to the public root) holding boundary files.
pub const GEO_DIR: &str = "world-map-json";

/// Directory (relative to the public root) holding CSV data.
pub const DATA_DIR: &str = "data";

/// Years offered by the AOD chart.
pub const CHART_YEARS: [i32; 6] = [2019, 2020, 2021, 2022, 2023, 2024];

/// Daily combined CSVs merged into the map index, lowest priority first.
pub const DAILY_CSV_FILES: [&str; 6] = [
    "HoChiMinhCity_daily_Alltime_combined.csv",
    "Hanoi_daily_Alltime_combined.csv",
    "Manila_daily_Alltime_combined.csv",
    "KualaLumpur_daily_Alltime_combined.csv",
    "Jakarta_daily_Alltime_combined.csv",
    "Vientiane_daily_Alltime_combined.csv",
];

/// A monitored city drawn as a marker when its country is selected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightCity {
    /// Display name, also used for coordinate lookup
    pub name: &'static str,
    /// Site name in the CSV data
    pub site: &'static str,
    /// Country key, see [`country_key_for_code`]
    pub country: &'static str,
    /// Fallback [lon, lat]
    pub default_coord: [f64; 2],
}

impl HighlightCity {
    pub fn default_coord(&self) -> Coord<f64> {
        Coord {
            x: self.default_coord[0],
            y: self.default_coord[1],
        }
    }
}

pub const HIGHLIGHT_CITIES: [HighlightCity; 6] = [
    HighlightCity {
        name: "Hanoi",
        site: "Hanoi",
        country: "vietnam",
        default_coord: [105.8342, 21.0278],
    },
    HighlightCity {
        name: "Ho Chi Minh City",
        site: "Ho Chi Minh City",
        country: "vietnam",
        default_coord: [106.660172, 10.762622],
    },
    HighlightCity {
        name: "Manila",
        site: "Manila",
        country: "philippines",
        default_coord: [120.9842, 14.5995],
    },
    HighlightCity {
        name: "Kuala Lumpur",
        site: "Kuala Lumpur",
        country: "malaysia",
        default_coord: [101.6869, 3.139],
    },
    HighlightCity {
        name: "Jakarta",
        site: "Jakarta Central",
        country: "indonesia",
        default_coord: [106.8456, -6.2088],
    },
    HighlightCity {
        name: "Vientiane",
        site: "Vientiane",
        country: "laos",
        default_coord: [102.6331, 17.9757],
    },
];

/// ISO alpha-3 and alpha-2 codes to country keys.
const COUNTRY_CODES: [(&str, &str); 10] = [
    ("vnm", "vietnam"),
    ("vn", "vietnam"),
    ("phl", "philippines"),
    ("ph", "philippines"),
    ("mys", "malaysia"),
    ("my", "malaysia"),
    ("idn", "indonesia"),
    ("id", "indonesia"),
    ("lao", "laos"),
    ("la", "laos"),
];

pub fn country_key_for_code(code: &str) -> Option<&'static str> {
    let code = code.trim().to_ascii_lowercase();
    COUNTRY_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, key)| *key)
}

/// Country key for a region: its codes first, then a name match.
///
/// "Lao PDR" resolves by code; a region with no codes resolves when its
/// normalized name contains a known key.
pub fn country_key(region: &Region) -> Option<&'static str> {
    let by_code = [region.adm0_a3.as_deref(), region.iso_a2.as_deref()]
        .into_iter()
        .flatten()
        .find_map(country_key_for_code);
    if by_code.is_some() {
        return by_code;
    }
    let name = region.normalized_name();
    if name.is_empty() {
        return None;
    }
    COUNTRY_CODES
        .iter()
        .map(|(_, key)| *key)
        .find(|key| name.contains(key))
}

/// Highlight cities located in the region's country.
pub fn cities_for_region(region: &Region) -> Vec<&'static HighlightCity> {
    match country_key(region) {
        Some(key) => HIGHLIGHT_CITIES.iter().filter(|c| c.country == key).collect(),
        None => Vec::new(),
    }
}

/// Highlight city whose display or site name matches, ignoring diacritics and case.
pub fn city_by_name(name: &str) -> Option<&'static HighlightCity> {
    let name = normalize_name(name);
    HIGHLIGHT_CITIES
        .iter()
        .find(|c| normalize_name(c.name) == name || normalize_name(c.site) == name)
}

/// A city offered by the AOD chart's region selector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountryOption {
    pub key: &'static str,
    /// Country name as it appears in the base map
    pub country: &'static str,
    /// File-name fragment of the AOD CSVs
    pub slug: &'static str,
    pub label: &'static str,
    /// Monthly PM2.5 file names, tried in order
    pub monthly_candidates: &'static [&'static str],
}

impl CountryOption {
    /// File name of the AOD CSV for a year: "PM2.5 - {year}_{slug}.csv"
    pub fn aod_file(&self, year: i32) -> String {
        format!("PM2.5 - {}_{}.csv", year, self.slug)
    }

    /// Monthly candidates, or names derived from the city label when none are listed.
    pub fn monthly_files(&self) -> Vec<String> {
        if !self.monthly_candidates.is_empty() {
            return self.monthly_candidates.iter().map(|s| s.to_string()).collect();
        }
        let city = self.label.split(',').next().unwrap_or(self.label).trim();
        let words: Vec<&str> = city.split_whitespace().collect();
        let mut files = vec![
            format!("{}_monthly.csv", words.join("_")),
            format!("{}_monthly.csv", words.concat()),
        ];
        if words.len() > 2 {
            files.push(format!("{}_monthly.csv", words[..2].join("_")));
        }
        if let Some(first) = words.first() {
            files.push(format!("{}_monthly.csv", first));
        }
        files
    }
}

pub const COUNTRY_OPTIONS: [CountryOption; 9] = [
    CountryOption {
        key: "Cambodia",
        country: "Cambodia",
        slug: "Phnom_Penh_Cambodia",
        label: "Phnom Penh, Cambodia",
        monthly_candidates: &["Phnom_Penh_Cambodia_monthly.csv", "Phnom_Penh_monthly.csv", "PhnomPenh_monthly.csv"],
    },
    CountryOption {
        key: "Indonesia",
        country: "Indonesia",
        slug: "Jakarta_Indonesia",
        label: "Jakarta, Indonesia",
        monthly_candidates: &["Jakarta_monthly.csv"],
    },
    CountryOption {
        key: "Laos",
        country: "Laos",
        slug: "Vientiane_Laos",
        label: "Vientiane, Laos",
        monthly_candidates: &["Vientiane_monthly.csv"],
    },
    CountryOption {
        key: "Malaysia",
        country: "Malaysia",
        slug: "Kuala_Lumpur_Malaysia",
        label: "Kuala Lumpur, Malaysia",
        monthly_candidates: &["Kuala_monthly.csv", "KualaLumpur_monthly.csv"],
    },
    CountryOption {
        key: "Myanmar",
        country: "Myanmar",
        slug: "Yangon_Myanmar",
        label: "Yangon, Myanmar",
        monthly_candidates: &["Yangon_monthly.csv"],
    },
    CountryOption {
        key: "Philippines",
        country: "Philippines",
        slug: "Manila_Philippines",
        label: "Manila, Philippines",
        monthly_candidates: &["Manila_monthly.csv"],
    },
    CountryOption {
        key: "Thailand",
        country: "Thailand",
        slug: "Bangkok_Thailand",
        label: "Bangkok, Thailand",
        monthly_candidates: &["Bangkok_monthly.csv"],
    },
    CountryOption {
        key: "Vietnam-Hanoi",
        country: "Vietnam",
        slug: "Hanoi_Vietnam",
        label: "Hanoi, Vietnam",
        monthly_candidates: &["hanoi_monthly.csv", "Hanoi_monthly.csv"],
    },
    CountryOption {
        key: "Vietnam-HCM",
        country: "Vietnam",
        slug: "Ho_Chi_Minh_Vietnam",
        label: "Ho Chi Minh City, Vietnam",
        monthly_candidates: &["hochi_minh_monthly.csv", "HoChiMinh_monthly.csv", "Ho_Chi_Minh_monthly.csv"],
    },
];

pub fn country_option(key: &str) -> Option<&'static CountryOption> {
    COUNTRY_OPTIONS.iter().find(|o| o.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::tests::SEA_SAMPLE;
    use crate::region::RegionCollection;

    #[test]
    fn test_country_key_by_code_and_name() {
        let regions = RegionCollection::parse(SEA_SAMPLE).unwrap();
        assert_eq!(country_key(regions.get(0).unwrap()), Some("vietnam"));
        assert_eq!(country_key(regions.get(2).unwrap()), Some("laos"));

        let mut unnamed_codes = regions.get(1).unwrap().clone();
        unnamed_codes.adm0_a3 = None;
        unnamed_codes.iso_a2 = Some("-99".to_string());
        assert_eq!(country_key(&unnamed_codes), Some("philippines"));

        unnamed_codes.name = "Thailand".to_string();
        assert_eq!(country_key(&unnamed_codes), None);
    }

    #[test]
    fn test_cities_for_region() {
        let regions = RegionCollection::parse(SEA_SAMPLE).unwrap();
        let names: Vec<&str> = cities_for_region(regions.get(0).unwrap())
            .iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Hanoi", "Ho Chi Minh City"]);
        assert_eq!(city_by_name("jakarta central").map(|c| c.name), Some("Jakarta"));
        assert_eq!(city_by_name("Hà Nội"), None);
        assert_eq!(city_by_name("hanoi").map(|c| c.site), Some("Hanoi"));
    }

    #[test]
    fn test_daily_files_in_merge_order() {
        assert_eq!(
            DAILY_CSV_FILES,
            [
                "HoChiMinhCity_daily_Alltime_combined.csv",
                "Hanoi_daily_Alltime_combined.csv",
                "Manila_daily_Alltime_combined.csv",
                "KualaLumpur_daily_Alltime_combined.csv",
                "Jakarta_daily_Alltime_combined.csv",
                "Vientiane_daily_Alltime_combined.csv",
            ]
        );
        // every highlight city's file is named after its display name
        for city in &HIGHLIGHT_CITIES {
            let stem: String = city.name.split_whitespace().collect();
            assert!(
                DAILY_CSV_FILES.iter().any(|f| f.starts_with(stem.as_str())),
                "no daily file for {}",
                city.name
            );
        }
    }

    #[test]
    fn test_country_options() {
        let hcm = country_option("Vietnam-HCM").unwrap();
        assert_eq!(hcm.aod_file(2021), "PM2.5 - 2021_Ho_Chi_Minh_Vietnam.csv");
        assert_eq!(hcm.monthly_files().len(), 3);

        let bare = CountryOption {
            monthly_candidates: &[],
            ..*hcm
        };
        assert_eq!(
            bare.monthly_files(),
            vec![
                "Ho_Chi_Minh_City_monthly.csv",
                "HoChiMinhCity_monthly.csv",
                "Ho_Chi_monthly.csv",
                "Ho_monthly.csv",
            ]
        );
    }
}
