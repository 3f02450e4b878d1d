//! Case-count summaries at national, province, city and country level.

use crate::dataset::{Counts, NameScheme, Province, Snapshot, WorldRecord};
use crate::error::{Error, Result};
use crate::naming::NamingPolicy;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySummary {
    pub city_name: String,
    #[serde(flatten)]
    pub counts: Counts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_danger_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mid_danger_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceSummary {
    pub province_short_name: String,
    #[serde(flatten)]
    pub counts: Counts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cities: Option<Vec<CitySummary>>,
}

/// Counts for every province, optionally with its cities.
///
/// Placeholder rows (imported cases, unassigned cases) are not cities and
/// are skipped. Provinces without a city breakdown report themselves as
/// their only city.
pub fn national(snapshot: &Snapshot, policy: &NamingPolicy, include_cities: bool) -> Vec<ProvinceSummary> {
    snapshot
        .provinces
        .iter()
        .map(|p| ProvinceSummary {
            province_short_name: p.province_short_name.clone(),
            counts: p.counts,
            cities: include_cities.then(|| province_cities(p, policy)),
        })
        .collect()
}

fn province_cities(province: &Province, policy: &NamingPolicy) -> Vec<CitySummary> {
    if policy.is_cityless_province(&province.province_short_name) {
        return vec![CitySummary {
            city_name: province.province_short_name.clone(),
            counts: province.counts,
            high_danger_count: None,
            mid_danger_count: None,
        }];
    }
    province
        .cities
        .iter()
        .filter(|c| !policy.is_placeholder_city(&c.city_name))
        .map(|c| CitySummary {
            city_name: c.city_name.clone(),
            counts: c.counts,
            high_danger_count: None,
            mid_danger_count: None,
        })
        .collect()
}

/// Counts of one province, found by full or short name.
pub fn province(snapshot: &Snapshot, name: &str) -> Result<ProvinceSummary> {
    let p = snapshot
        .province(name)
        .ok_or_else(|| Error::NotFound(format!("province '{}'", name)))?;
    Ok(ProvinceSummary {
        province_short_name: p.province_short_name.clone(),
        counts: p.counts,
        cities: None,
    })
}

pub fn city(snapshot: &Snapshot, province: &str, city: &str, include_danger_counts: bool) -> Result<CitySummary> {
    let (_, c) = snapshot
        .city(province, city)
        .ok_or_else(|| Error::NotFound(format!("city '{}' in '{}'", city, province)))?;
    Ok(CitySummary {
        city_name: c.city_name.clone(),
        counts: c.counts,
        high_danger_count: include_danger_counts.then_some(c.high_danger_count),
        mid_danger_count: include_danger_counts.then_some(c.mid_danger_count),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySummary {
    pub country_name: String,
    #[serde(flatten)]
    pub counts: Counts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continents: Option<String>,
}

/// Latin name of a native continent label; unknown labels pass through.
pub fn continent_latin(native: &str) -> &str {
    match native {
        "亚洲" => "Asia",
        "欧洲" => "Europe",
        "非洲" => "Africa",
        "北美洲" => "North America",
        "南美洲" => "South America",
        "大洋洲" => "Oceania",
        "南极洲" => "Antarctica",
        "其他" => "Other",
        other => other,
    }
}

fn country_summary(record: &WorldRecord, scheme: NameScheme, with_continent: bool) -> CountrySummary {
    let (name, continent) = match scheme {
        NameScheme::Native => (&record.province_name, record.continents.as_str()),
        NameScheme::Latin => (&record.country_full_name, continent_latin(&record.continents)),
    };
    CountrySummary {
        country_name: name.clone(),
        counts: record.counts,
        continents: with_continent.then(|| continent.to_string()),
    }
}

pub fn world(snapshot: &Snapshot, scheme: NameScheme) -> Vec<CountrySummary> {
    snapshot
        .countries
        .iter()
        .map(|c| country_summary(c, scheme, true))
        .collect()
}

/// One country, by native label or full name depending on `scheme`.
pub fn country(snapshot: &Snapshot, name: &str, scheme: NameScheme) -> Result<CountrySummary> {
    snapshot
        .country_by_name(name, scheme)
        .map(|c| country_summary(c, scheme, false))
        .ok_or_else(|| Error::NotFound(format!("country '{}'", name)))
}
