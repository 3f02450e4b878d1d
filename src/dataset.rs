//! The parsed epidemic snapshot: provinces with their cities and danger
//! areas, world records per country, and the news timeline.
//!
//! Field names follow the upstream JSON blocks (`areaStat`,
//! `worldStat`, `timeline`). Everything here is read-only once loaded.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Current/cumulative case counts shared by provinces, cities and countries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Counts {
    pub current_confirmed_count: i64,
    pub confirmed_count: i64,
    pub cured_count: i64,
    pub dead_count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct City {
    pub city_name: String,
    #[serde(flatten)]
    pub counts: Counts,
    pub high_danger_count: u32,
    pub mid_danger_count: u32,
}

impl City {
    pub fn has_danger(&self) -> bool {
        self.high_danger_count > 0 || self.mid_danger_count > 0
    }
}

/// Severity of a danger area, parsed from the integer `dangerLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DangerLevel {
    High,
    Mid,
    Unclassified(i64),
}

impl From<i64> for DangerLevel {
    fn from(level: i64) -> Self {
        match level {
            1 => Self::High,
            2 => Self::Mid,
            other => Self::Unclassified(other),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DangerArea {
    /// Name of the owning city, matched against the province's `cities`.
    pub city_name: String,
    pub area_name: String,
    pub danger_level: i64,
}

impl DangerArea {
    pub fn level(&self) -> DangerLevel {
        DangerLevel::from(self.danger_level)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Province {
    pub province_name: String,
    pub province_short_name: String,
    #[serde(flatten)]
    pub counts: Counts,
    pub high_danger_count: u32,
    pub mid_danger_count: u32,
    pub cities: Vec<City>,
    pub danger_areas: Vec<DangerArea>,
    /// Timeline URL, opaque to everything except the timeline client.
    pub statistics_data: String,
}

impl Province {
    pub fn has_danger(&self) -> bool {
        self.high_danger_count > 0 || self.mid_danger_count > 0
    }

    /// True if `name` is either the full or the short name.
    pub fn is_named(&self, name: &str) -> bool {
        self.province_name == name || self.province_short_name == name
    }

    pub fn city(&self, name: &str) -> Option<&City> {
        self.cities.iter().find(|c| c.city_name == name)
    }
}

/// A per-country record of the world table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldRecord {
    /// ISO 3166-1 alpha-3 code.
    pub country_short_code: String,
    pub country_full_name: String,
    /// Native-script country label (the upstream reuses `provinceName`).
    pub province_name: String,
    #[serde(flatten)]
    pub counts: Counts,
    pub continents: String,
    pub statistics_data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsRecord {
    pub id: i64,
    /// Milliseconds since the Unix epoch.
    pub pub_date: i64,
    pub pub_date_str: String,
    pub title: String,
    pub summary: String,
    pub info_source: String,
    pub source_url: String,
    pub province_id: String,
}

/// Which of a record's two names to report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameScheme {
    /// Native-script names, as the dataset stores them.
    #[default]
    Native,
    /// Latin-script full names.
    Latin,
}

impl std::str::FromStr for NameScheme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" | "zh" | "zh_cn" => Ok(Self::Native),
            "latin" | "en" | "en_us" => Ok(Self::Latin),
            _ => Err(format!("Unknown name scheme '{}'. Use 'native' or 'latin'.", s)),
        }
    }
}

/// One loaded snapshot of the upstream page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "areaStat", default)]
    pub provinces: Vec<Province>,
    #[serde(rename = "worldStat", default)]
    pub countries: Vec<WorldRecord>,
    #[serde(rename = "timeline", default)]
    pub news: Vec<NewsRecord>,
}

impl Snapshot {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Find a province by its full or short name.
    pub fn province(&self, name: &str) -> Option<&Province> {
        self.provinces.iter().find(|p| p.is_named(name))
    }

    pub fn city(&self, province: &str, city: &str) -> Option<(&Province, &City)> {
        let p = self.province(province)?;
        p.city(city).map(|c| (p, c))
    }

    /// Exact, case-sensitive match on the alpha-3 code.
    pub fn country_by_code(&self, alpha3: &str) -> Option<&WorldRecord> {
        self.countries.iter().find(|c| c.country_short_code == alpha3)
    }

    pub fn country_by_name(&self, name: &str, scheme: NameScheme) -> Option<&WorldRecord> {
        self.countries.iter().find(|c| match scheme {
            NameScheme::Native => c.province_name == name,
            NameScheme::Latin => c.country_full_name == name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "areaStat": [{
            "provinceName": "上海市",
            "provinceShortName": "上海",
            "currentConfirmedCount": 12,
            "confirmedCount": 400,
            "curedCount": 380,
            "deadCount": 8,
            "highDangerCount": 1,
            "midDangerCount": 0,
            "cities": [{"cityName": "杨浦区", "confirmedCount": 3, "highDangerCount": 1}],
            "dangerAreas": [{"cityName": "杨浦区", "areaName": "某小区", "dangerLevel": 1}],
            "statisticsData": "https://example.invalid/sh.json"
        }],
        "worldStat": [{
            "countryShortCode": "USA",
            "countryFullName": "United States of America",
            "provinceName": "美国",
            "confirmedCount": 10,
            "continents": "北美洲"
        }]
    }"#;

    #[test]
    fn test_parse_sample_with_defaults() {
        let snap = Snapshot::from_json(SAMPLE).unwrap();
        assert_eq!(snap.provinces.len(), 1);
        assert!(snap.news.is_empty());

        let p = &snap.provinces[0];
        assert_eq!(p.counts.confirmed_count, 400);
        assert_eq!(p.cities[0].counts.current_confirmed_count, 0);
        assert_eq!(p.cities[0].mid_danger_count, 0);
        assert_eq!(p.danger_areas[0].level(), DangerLevel::High);
    }

    #[test]
    fn test_province_lookup_by_either_name() {
        let snap = Snapshot::from_json(SAMPLE).unwrap();
        assert!(snap.province("上海").is_some());
        assert!(snap.province("上海市").is_some());
        assert!(snap.province("北京").is_none());
        assert!(snap.city("上海", "杨浦区").is_some());
        assert!(snap.city("上海", "黄浦区").is_none());
    }

    #[test]
    fn test_country_lookup() {
        let snap = Snapshot::from_json(SAMPLE).unwrap();
        assert!(snap.country_by_code("USA").is_some());
        assert!(snap.country_by_code("usa").is_none());
        assert!(snap.country_by_name("美国", NameScheme::Native).is_some());
        assert!(snap.country_by_name("United States of America", NameScheme::Latin).is_some());
        assert!(snap.country_by_name("美国", NameScheme::Latin).is_none());
    }

    #[test]
    fn test_danger_level_parsing() {
        assert_eq!(DangerLevel::from(1), DangerLevel::High);
        assert_eq!(DangerLevel::from(2), DangerLevel::Mid);
        assert_eq!(DangerLevel::from(3), DangerLevel::Unclassified(3));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        let mut f = File::create(&path).unwrap();
        f.write_all(SAMPLE.as_bytes()).unwrap();

        let snap = Snapshot::load(&path).unwrap();
        assert_eq!(snap.countries[0].country_full_name, "United States of America");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = Snapshot::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)));
    }

    #[test]
    fn test_name_scheme_parse() {
        assert_eq!("zh_CN".parse::<NameScheme>().unwrap(), NameScheme::Native);
        assert_eq!("Latin".parse::<NameScheme>().unwrap(), NameScheme::Latin);
        assert!("klingon".parse::<NameScheme>().is_err());
    }
}
