//! Danger-zone aggregation.
//!
//! Walks every province with danger presence, classifies its danger areas by
//! level and rebuilds each area's display name as canonical city name plus
//! the area label with province and city prefixes removed.

use crate::dataset::{City, DangerArea, DangerLevel, Province, Snapshot};
use crate::error::{Error, Result};
use crate::location::{GeoLookup, RegionResolver};
use crate::naming::NamingPolicy;
use serde::{Deserialize, Serialize};

/// Which parts of the rollup to produce. At least one must be enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DangerOptions {
    pub include_cities: bool,
    pub include_counts: bool,
    pub include_danger_areas: bool,
}

impl Default for DangerOptions {
    fn default() -> Self {
        Self {
            include_cities: true,
            include_counts: true,
            include_danger_areas: true,
        }
    }
}

impl DangerOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.include_cities && !self.include_counts && !self.include_danger_areas {
            return Err(Error::Configuration(
                "include_cities, include_counts and include_danger_areas cannot all be false".into(),
            ));
        }
        Ok(())
    }

    /// Without cities or counts the per-province nesting carries nothing but
    /// area names, so the report is flattened.
    fn wants_merged(&self) -> bool {
        !self.include_cities && !self.include_counts
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityDangerCount {
    pub city_name: String,
    pub high_danger: u32,
    pub mid_danger: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceDangerRollup {
    pub province_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cities: Option<Vec<CityDangerCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_danger: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mid_danger: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_danger_areas: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mid_danger_areas: Option<Vec<String>>,
    /// Areas whose level is neither high nor mid.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unclassified_areas: Vec<String>,
}

/// Area names of every province in one list per level, each prefixed with
/// the owning province's full name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedDangerAreas {
    pub high_danger_areas: Vec<String>,
    pub mid_danger_areas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", content = "data", rename_all = "lowercase")]
pub enum DangerReport {
    /// No province has any danger presence.
    Empty,
    Nested(Vec<ProvinceDangerRollup>),
    Merged(MergedDangerAreas),
}

pub fn aggregate(snapshot: &Snapshot, policy: &NamingPolicy, options: DangerOptions) -> Result<DangerReport> {
    options.validate()?;

    let mut rollups = Vec::new();
    let mut merged = MergedDangerAreas::default();

    for province in snapshot.provinces.iter().filter(|p| p.has_danger()) {
        let mut rollup = ProvinceDangerRollup {
            province_name: province.province_short_name.clone(),
            ..ProvinceDangerRollup::default()
        };

        if options.include_cities {
            rollup.cities = Some(
                province
                    .cities
                    .iter()
                    .filter(|c| c.has_danger())
                    .map(|c| CityDangerCount {
                        city_name: c.city_name.clone(),
                        high_danger: c.high_danger_count,
                        mid_danger: c.mid_danger_count,
                    })
                    .collect(),
            );
        }

        if options.include_counts {
            rollup.high_danger = Some(province.high_danger_count);
            rollup.mid_danger = Some(province.mid_danger_count);
        }

        if options.include_danger_areas {
            let mut high = Vec::new();
            let mut mid = Vec::new();
            for area in &province.danger_areas {
                let name = area_display_name(province, area, policy);
                match area.level() {
                    DangerLevel::High => {
                        merged.high_danger_areas.push(format!("{}{}", province.province_name, name));
                        high.push(name);
                    }
                    DangerLevel::Mid => {
                        merged.mid_danger_areas.push(format!("{}{}", province.province_name, name));
                        mid.push(name);
                    }
                    DangerLevel::Unclassified(_) => rollup.unclassified_areas.push(name),
                }
            }
            rollup.high_danger_areas = Some(high);
            rollup.mid_danger_areas = Some(mid);
        }

        rollups.push(rollup);
    }

    Ok(if rollups.is_empty() {
        DangerReport::Empty
    } else if options.wants_merged() {
        DangerReport::Merged(merged)
    } else {
        DangerReport::Nested(rollups)
    })
}

/// Canonical city name followed by the area label with one leading
/// province name and one leading city name peeled off.
///
/// Names are only ever removed from the front of the label. When the label
/// opens with the city name and that match is at least as long as the
/// province match (吉林 vs 吉林市), the province is left alone.
pub fn area_display_name(province: &Province, area: &DangerArea, policy: &NamingPolicy) -> String {
    let city = policy.canonicalize(&area.city_name);
    let city_names = [city.as_str(), area.city_name.as_str()];
    let province_names = [province.province_name.as_str(), province.province_short_name.as_str()];

    let mut label = area.area_name.as_str();
    if let Some((rest, len)) = peel_prefix(label, &province_names) {
        let city_len = peel_prefix(label, &city_names).map_or(0, |(_, l)| l);
        if len > city_len {
            label = rest;
        }
    }
    if let Some((rest, _)) = peel_prefix(label, &city_names) {
        label = rest;
    }
    city + label
}

/// Strip the longest of `names` that `label` starts with, returning the rest
/// and the stripped length.
fn peel_prefix<'a>(label: &'a str, names: &[&str]) -> Option<(&'a str, usize)> {
    names
        .iter()
        .filter(|n| !n.is_empty())
        .filter_map(|n| label.strip_prefix(n).map(|rest| (rest, n.len())))
        .max_by_key(|(_, len)| *len)
}

// ─── Per-city breakdown ──────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityDangerDetail {
    /// Canonical display name.
    pub city_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_danger_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mid_danger_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_danger_areas: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mid_danger_areas: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceDangerDetail {
    pub province_name: String,
    pub high_danger_count: u32,
    pub mid_danger_count: u32,
    pub cities: Vec<CityDangerDetail>,
}

/// Every city's own area lists, grouped by province. A level with no areas
/// is omitted together with its count.
pub fn detail(snapshot: &Snapshot, policy: &NamingPolicy) -> Vec<ProvinceDangerDetail> {
    snapshot
        .provinces
        .iter()
        .filter(|p| p.has_danger())
        .map(|p| ProvinceDangerDetail {
            province_name: p.province_name.clone(),
            high_danger_count: p.high_danger_count,
            mid_danger_count: p.mid_danger_count,
            cities: p
                .cities
                .iter()
                .filter(|c| c.has_danger())
                .map(|c| city_breakdown(p, c, policy))
                .collect(),
        })
        .collect()
}

fn city_breakdown(province: &Province, city: &City, policy: &NamingPolicy) -> CityDangerDetail {
    let mut high = Vec::new();
    let mut mid = Vec::new();
    for area in province.danger_areas.iter().filter(|a| a.city_name == city.city_name) {
        match area.level() {
            DangerLevel::High => high.push(area.area_name.clone()),
            DangerLevel::Mid => mid.push(area.area_name.clone()),
            DangerLevel::Unclassified(_) => {}
        }
    }

    let mut out = CityDangerDetail {
        city_name: policy.canonicalize(&city.city_name),
        ..CityDangerDetail::default()
    };
    if !high.is_empty() {
        out.high_danger_count = Some(city.high_danger_count);
        out.high_danger_areas = Some(high);
    }
    if !mid.is_empty() {
        out.mid_danger_count = Some(city.mid_danger_count);
        out.mid_danger_areas = Some(mid);
    }
    out
}

/// Breakdown for one city. With no province given, the first province
/// holding a city of that name is used.
pub fn city_detail(
    snapshot: &Snapshot,
    policy: &NamingPolicy,
    province: Option<&str>,
    city: &str,
) -> Result<CityDangerDetail> {
    snapshot
        .provinces
        .iter()
        .filter(|p| province.map_or(true, |name| p.is_named(name)))
        .find_map(|p| p.city(city).map(|c| city_breakdown(p, c, policy)))
        .ok_or_else(|| Error::NotFound(format!("city '{}'", city)))
}

/// Breakdown for the caller's own city, located through `lookup`.
pub fn city_detail_auto(
    snapshot: &Snapshot,
    policy: &NamingPolicy,
    resolver: &RegionResolver<'_>,
    lookup: &dyn GeoLookup,
) -> Result<CityDangerDetail> {
    let place = resolver.resolve_auto(lookup);
    let city = place
        .city()
        .ok_or_else(|| Error::NotFound("current city could not be resolved".into()))?;
    city_detail(snapshot, policy, place.province(), city)
}
