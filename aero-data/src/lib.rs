//! Aggregation and preprocessing of PM2.5 and AOD observations.
//!
//! This crate turns an indexed time series into the per-period values the
//! map and charts show, and holds the batch steps that prepare raw station
//! exports for the index.

pub mod aggregate;
pub mod combine;
pub mod daily;
pub mod rollup;
pub mod series;
pub mod union;

/// US EPA air quality categories.
pub mod category {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub enum AqiCategory {
        Good,
        Moderate,
        UnhealthySensitive,
        Unhealthy,
        VeryUnhealthy,
        Hazardous,
    }

    const ALL: [AqiCategory; 6] = [
        AqiCategory::Good,
        AqiCategory::Moderate,
        AqiCategory::UnhealthySensitive,
        AqiCategory::Unhealthy,
        AqiCategory::VeryUnhealthy,
        AqiCategory::Hazardous,
    ];

    impl AqiCategory {
        /// Category for an AQI index value.
        pub fn from_aqi(aqi: f64) -> AqiCategory {
            match aqi {
                a if a <= 50.0 => AqiCategory::Good,
                a if a <= 100.0 => AqiCategory::Moderate,
                a if a <= 150.0 => AqiCategory::UnhealthySensitive,
                a if a <= 200.0 => AqiCategory::Unhealthy,
                a if a <= 300.0 => AqiCategory::VeryUnhealthy,
                _ => AqiCategory::Hazardous,
            }
        }

        /// Category for a 24h PM2.5 concentration in µg/m³.
        pub fn from_pm25(pm: f64) -> AqiCategory {
            match pm {
                v if v <= 12.0 => AqiCategory::Good,
                v if v <= 35.4 => AqiCategory::Moderate,
                v if v <= 55.4 => AqiCategory::UnhealthySensitive,
                v if v <= 150.4 => AqiCategory::Unhealthy,
                v if v <= 250.4 => AqiCategory::VeryUnhealthy,
                _ => AqiCategory::Hazardous,
            }
        }

        pub fn label(&self) -> &'static str {
            match self {
                AqiCategory::Good => "Good",
                AqiCategory::Moderate => "Moderate",
                AqiCategory::UnhealthySensitive => "Unhealthy for Sensitive Groups",
                AqiCategory::Unhealthy => "Unhealthy",
                AqiCategory::VeryUnhealthy => "Very Unhealthy",
                AqiCategory::Hazardous => "Hazardous",
            }
        }

        pub fn color(&self) -> &'static str {
            match self {
                AqiCategory::Good => "#16a34a",
                AqiCategory::Moderate => "#f97316",
                AqiCategory::UnhealthySensitive => "#ef4444",
                AqiCategory::Unhealthy => "#dc2626",
                AqiCategory::VeryUnhealthy => "#991b1b",
                AqiCategory::Hazardous => "#7f1d1d",
            }
        }

        /// Parse a label as written by [`AqiCategory::label`], ignoring case.
        pub fn parse(label: &str) -> Option<AqiCategory> {
            let label = label.trim();
            ALL.into_iter().find(|c| c.label().eq_ignore_ascii_case(label))
        }

        pub fn is_unhealthy(&self) -> bool {
            *self >= AqiCategory::UnhealthySensitive
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_breakpoints() {
            assert_eq!(AqiCategory::from_aqi(50.0), AqiCategory::Good);
            assert_eq!(AqiCategory::from_aqi(50.5), AqiCategory::Moderate);
            assert_eq!(AqiCategory::from_aqi(301.0), AqiCategory::Hazardous);
            assert_eq!(AqiCategory::from_pm25(12.0), AqiCategory::Good);
            assert_eq!(AqiCategory::from_pm25(35.5), AqiCategory::UnhealthySensitive);
            assert_eq!(AqiCategory::from_pm25(60.0), AqiCategory::Unhealthy);
        }

        #[test]
        fn test_labels() {
            assert_eq!(
                AqiCategory::parse("unhealthy for sensitive groups"),
                Some(AqiCategory::UnhealthySensitive)
            );
            assert_eq!(AqiCategory::parse("Smoky"), None);
            assert!(!AqiCategory::Moderate.is_unhealthy());
            assert!(AqiCategory::VeryUnhealthy.is_unhealthy());
        }
    }
}
