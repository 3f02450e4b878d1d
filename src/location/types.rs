//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel written into every field of a [`ResolvedPlace`] when the place
/// could not be resolved at all.
pub const FAILED: &str = "Failed";

/// Free-text location as reported by a geolocation service, in the caller's
/// romanization rather than the dataset's native script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoHint {
    /// ISO 3166-1 alpha-2 code (e.g. "CN", "US"); alpha-3 is accepted too.
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub city: String,
}

impl GeoHint {
    pub fn new(country: impl Into<String>, region: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            region: region.into(),
            city: city.into(),
        }
    }
}

/// Outcome of region resolution.
///
/// Three shapes are possible:
/// - every field is [`FAILED`]: the lookup failed or the country is unknown;
/// - a field is empty: the level above matched but this one did not;
/// - otherwise the field carries a dataset-native (or verbatim foreign) name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPlace {
    pub country_name: String,
    pub province_name: String,
    pub city_name: String,
}

impl ResolvedPlace {
    pub fn failed() -> Self {
        Self {
            country_name: FAILED.into(),
            province_name: FAILED.into(),
            city_name: FAILED.into(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.country_name == FAILED
    }

    pub fn province(&self) -> Option<&str> {
        non_sentinel(&self.province_name)
    }

    pub fn city(&self) -> Option<&str> {
        non_sentinel(&self.city_name)
    }
}

fn non_sentinel(s: &str) -> Option<&str> {
    if s.is_empty() || s == FAILED {
        None
    } else {
        Some(s)
    }
}

/// Geolocation lookup errors. These never leave the resolver.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid lookup response: {0}")]
    InvalidResponse(String),
    #[error("Lookup disabled in offline mode")]
    Offline,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_place_serializes_sentinel_everywhere() {
        let json = serde_json::to_value(ResolvedPlace::failed()).unwrap();
        assert_eq!(json["countryName"], "Failed");
        assert_eq!(json["provinceName"], "Failed");
        assert_eq!(json["cityName"], "Failed");
    }

    #[test]
    fn test_accessors_skip_empty_and_sentinel() {
        let place = ResolvedPlace {
            country_name: "中国".into(),
            province_name: "上海".into(),
            city_name: String::new(),
        };
        assert!(!place.is_failed());
        assert_eq!(place.province(), Some("上海"));
        assert_eq!(place.city(), None);
        assert_eq!(ResolvedPlace::failed().province(), None);
    }

    #[test]
    fn test_hint_deserializes_partial() {
        let hint: GeoHint = serde_json::from_str(r#"{"country": "US", "ip": "1.2.3.4"}"#).unwrap();
        assert_eq!(hint.country, "US");
        assert!(hint.region.is_empty());
    }
}
