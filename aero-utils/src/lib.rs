//! Shared utility functions for Aero-Cast crates.

/// Date utility functions
pub mod dates {
    use chrono::{Datelike, Month, NaiveDate};

    /// Full English month name for a 1-based month number.
    pub fn month_name(month: u32) -> Option<&'static str> {
        let month = u8::try_from(month).ok()?;
        Month::try_from(month).ok().map(|m| m.name())
    }

    /// Parse a full or abbreviated month name ("March", "mar") to 1..=12.
    pub fn month_from_name(name: &str) -> Option<u32> {
        name.trim().parse::<Month>().ok().map(|m| m.number_from_month())
    }

    /// Format a year/month pair as "MM/YY"
    pub fn format_month_label(year: i32, month: u32) -> String {
        format!("{:02}/{:02}", month, year.rem_euclid(100))
    }

    /// Format a date as "DD/MM/YY"
    pub fn format_day_label(date: &NaiveDate) -> String {
        date.format("%d/%m/%y").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
    }

    /// Monsoon season of the Mekong region.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Season {
        Dry,
        Wet,
    }

    impl Season {
        /// December through April is dry; May through November is wet.
        pub fn for_month(month: u32) -> Season {
            match month {
                5..=11 => Season::Wet,
                _ => Season::Dry,
            }
        }

        pub fn label(&self) -> &'static str {
            match self {
                Season::Dry => "Dry",
                Season::Wet => "Wet",
            }
        }
    }

    /// Finer seasonal windows used by the time-lapse view.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum SeasonPeriod {
        /// Jan 1 - end of Feb
        Dry1,
        /// Mar 1 - Apr 30
        Dry2,
        /// May 1 - Aug 15
        Wet1,
        /// Aug 16 - Nov 30
        Wet2,
        /// December
        Dry3,
    }

    impl SeasonPeriod {
        pub fn for_date(date: &NaiveDate) -> SeasonPeriod {
            match (date.month(), date.day()) {
                (1..=2, _) => SeasonPeriod::Dry1,
                (3..=4, _) => SeasonPeriod::Dry2,
                (5..=7, _) => SeasonPeriod::Wet1,
                (8, d) if d <= 15 => SeasonPeriod::Wet1,
                (8..=11, _) => SeasonPeriod::Wet2,
                _ => SeasonPeriod::Dry3,
            }
        }

        pub fn season(&self) -> Season {
            match self {
                SeasonPeriod::Wet1 | SeasonPeriod::Wet2 => Season::Wet,
                _ => Season::Dry,
            }
        }

        pub fn key(&self) -> &'static str {
            match self {
                SeasonPeriod::Dry1 => "Dry-1",
                SeasonPeriod::Dry2 => "Dry-2",
                SeasonPeriod::Wet1 => "Wet-1",
                SeasonPeriod::Wet2 => "Wet-2",
                SeasonPeriod::Dry3 => "Dry-3",
            }
        }

        /// Human label; the Dry-1 window ends on Feb 28th or 29th depending on `year`.
        pub fn label(&self, year: i32) -> String {
            match self {
                SeasonPeriod::Dry1 => {
                    let feb_last = if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                        29
                    } else {
                        28
                    };
                    format!("Dry (Jan 1st - Feb {}th)", feb_last)
                }
                SeasonPeriod::Dry2 => "Dry (Mar 1st - Apr 30th)".to_string(),
                SeasonPeriod::Wet1 => "Wet (May 1st - Aug 15th)".to_string(),
                SeasonPeriod::Wet2 => "Wet (Aug 16th - Nov 30th)".to_string(),
                SeasonPeriod::Dry3 => "Dry (Dec)".to_string(),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_month_names() {
            assert_eq!(month_name(1), Some("January"));
            assert_eq!(month_name(12), Some("December"));
            assert_eq!(month_name(0), None);
            assert_eq!(month_name(13), None);
            assert_eq!(month_from_name("March"), Some(3));
            assert_eq!(month_from_name("sep"), Some(9));
            assert_eq!(month_from_name("Smarch"), None);
        }

        #[test]
        fn test_labels() {
            assert_eq!(format_month_label(2021, 3), "03/21");
            let date = NaiveDate::from_ymd_opt(2020, 1, 5).unwrap();
            assert_eq!(format_day_label(&date), "05/01/20");
        }

        #[test]
        fn test_season_for_month() {
            assert_eq!(Season::for_month(12), Season::Dry);
            assert_eq!(Season::for_month(4), Season::Dry);
            assert_eq!(Season::for_month(5), Season::Wet);
            assert_eq!(Season::for_month(11), Season::Wet);
        }

        #[test]
        fn test_season_period_boundaries() {
            let aug15 = NaiveDate::from_ymd_opt(2023, 8, 15).unwrap();
            let aug16 = NaiveDate::from_ymd_opt(2023, 8, 16).unwrap();
            let dec1 = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
            assert_eq!(SeasonPeriod::for_date(&aug15), SeasonPeriod::Wet1);
            assert_eq!(SeasonPeriod::for_date(&aug16), SeasonPeriod::Wet2);
            assert_eq!(SeasonPeriod::for_date(&dec1), SeasonPeriod::Dry3);
            assert_eq!(SeasonPeriod::Dry1.label(2024), "Dry (Jan 1st - Feb 29th)");
            assert_eq!(SeasonPeriod::Dry1.label(2023), "Dry (Jan 1st - Feb 28th)");
        }
    }
}

/// Place-name matching helpers
pub mod names {
    /// Lowercase a name and drop diacritics so "Hà Nội" matches "ha noi".
    ///
    /// Covers the Latin-1, Latin Extended and Vietnamese precomposed ranges
    /// plus any combining marks (U+0300..U+036F) already present.
    pub fn normalize_name(s: &str) -> String {
        s.chars()
            .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
            .flat_map(|c| fold_char(c).to_lowercase())
            .collect::<String>()
            .trim()
            .to_string()
    }

    fn fold_char(c: char) -> char {
        if c.is_ascii() {
            return c;
        }
        match c.to_lowercase().next().unwrap_or(c) {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' | 'ạ' | 'ả' | 'ấ' | 'ầ' | 'ẩ'
            | 'ẫ' | 'ậ' | 'ắ' | 'ằ' | 'ẳ' | 'ẵ' | 'ặ' => 'a',
            'ç' | 'ć' | 'č' => 'c',
            'đ' | 'ď' => 'd',
            'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' | 'ẹ' | 'ẻ' | 'ẽ' | 'ế' | 'ề' | 'ể' | 'ễ'
            | 'ệ' => 'e',
            'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ỉ' | 'ị' => 'i',
            'ñ' | 'ń' | 'ň' => 'n',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ơ' | 'ọ' | 'ỏ' | 'ố' | 'ồ' | 'ổ' | 'ỗ'
            | 'ộ' | 'ớ' | 'ờ' | 'ở' | 'ỡ' | 'ợ' => 'o',
            'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ư' | 'ụ' | 'ủ' | 'ứ' | 'ừ' | 'ử' | 'ữ' | 'ự' => {
                'u'
            }
            'ý' | 'ÿ' | 'ỳ' | 'ỵ' | 'ỷ' | 'ỹ' => 'y',
            other => other,
        }
    }

    /// Lowercase and strip `_`, `-` and whitespace: "Ho Chi_Minh" -> "hochiminh".
    pub fn compact_name(s: &str) -> String {
        s.chars()
            .filter(|c| !(c.is_whitespace() || *c == '_' || *c == '-'))
            .flat_map(char::to_lowercase)
            .collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_normalize_name() {
            assert_eq!(normalize_name("Hà Nội"), "ha noi");
            assert_eq!(normalize_name("Việt Nam"), "viet nam");
            assert_eq!(normalize_name("Ha\u{0300} Noi"), "ha noi");
            assert_eq!(normalize_name("  Manila "), "manila");
        }

        #[test]
        fn test_compact_name() {
            assert_eq!(compact_name("Ho Chi_Minh-City"), "hochiminhcity");
            assert_eq!(compact_name("VNM"), "vnm");
        }
    }
}

/// Display formatting for measured values
pub mod format {
    /// Format an optional value with fixed decimals; absent or non-finite renders "-".
    pub fn fmt_value(value: Option<f64>, decimals: usize) -> String {
        match value {
            Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
            _ => "-".to_string(),
        }
    }

    /// Compact number formatting for SVG attributes (at most 2 decimals, no trailing zeros).
    pub fn fmt_coord(v: f64) -> String {
        let s = format!("{:.2}", v);
        let s = s.trim_end_matches('0').trim_end_matches('.');
        if s == "-0" {
            "0".to_string()
        } else {
            s.to_string()
        }
    }

}

/// Gzip-aware text decoding for fetched assets
pub mod compression {
    use flate2::read::GzDecoder;
    use std::io::Read;

    /// True when the asset name carries a `.gz` suffix.
    pub fn is_gzip_name(name: &str) -> bool {
        name.to_ascii_lowercase().ends_with(".gz")
    }

    /// Decode a fetched body to UTF-8 text, gunzipping first when `gzip` is set.
    pub fn decode_text(bytes: &[u8], gzip: bool) -> anyhow::Result<String> {
        if !gzip {
            return Ok(String::from_utf8(bytes.to_vec())?);
        }
        let mut decoder = GzDecoder::new(bytes);
        let mut out = String::new();
        decoder.read_to_string(&mut out)?;
        Ok(out)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        #[test]
        fn test_decode_gzip() {
            let mut enc = GzEncoder::new(Vec::new(), Compression::default());
            enc.write_all(b"Site,Year\nHanoi,2021\n").unwrap();
            let bytes = enc.finish().unwrap();
            let text = decode_text(&bytes, true).unwrap();
            assert_eq!(text, "Site,Year\nHanoi,2021\n");
        }

        #[test]
        fn test_decode_plain_and_names() {
            assert_eq!(decode_text(b"abc", false).unwrap(), "abc");
            assert!(decode_text(b"abc", true).is_err());
            assert!(is_gzip_name("Hanoi_daily.csv.GZ"));
            assert!(!is_gzip_name("Hanoi_daily.csv"));
        }
    }
}
