//! Region resolver: walks country → province → city for a free-text hint.
//!
//! Country: exact alpha-3 match against the world table, else every field `"Failed"`.
//! Home country: transliteration match on province short names, then on the
//!   matched province's city names; first match in dataset order wins.
//! Foreign country: full name from the world table, region and city verbatim.

use super::iso;
use super::providers::GeoLookup;
use super::romanize::{self, Romanizer};
use super::types::{GeoHint, ResolvedPlace};
use crate::dataset::Snapshot;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Two or more names at the same level sharing one transliteration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCollision {
    /// Owning province short name, or `None` for the province level itself.
    pub province: Option<String>,
    pub key: String,
    /// Colliding names in dataset order; the first one wins at resolve time.
    pub names: Vec<String>,
}

pub struct RegionResolver<'a> {
    snapshot: &'a Snapshot,
    romanizer: &'a dyn Romanizer,
    home_country: &'a str,
}

impl<'a> RegionResolver<'a> {
    pub fn new(snapshot: &'a Snapshot, romanizer: &'a dyn Romanizer, home_country: &'a str) -> Self {
        Self {
            snapshot,
            romanizer,
            home_country,
        }
    }

    pub fn resolve(&self, hint: &GeoHint) -> ResolvedPlace {
        let country = iso::to_alpha3(&hint.country).and_then(|a3| self.snapshot.country_by_code(a3));
        let Some(country) = country else {
            debug!(country = %hint.country, "no world record for country code");
            return ResolvedPlace::failed();
        };

        if country.country_short_code != self.home_country {
            return ResolvedPlace {
                country_name: country.country_full_name.clone(),
                province_name: hint.region.clone(),
                city_name: hint.city.clone(),
            };
        }

        let mut place = ResolvedPlace {
            country_name: country.province_name.clone(),
            ..ResolvedPlace::default()
        };

        let province = self
            .snapshot
            .provinces
            .iter()
            .find(|p| romanize::matches(self.romanizer, &p.province_short_name, &hint.region));
        let Some(province) = province else {
            debug!(region = %hint.region, "no province matched");
            return place;
        };
        place.province_name = province.province_short_name.clone();

        match province
            .cities
            .iter()
            .find(|c| romanize::matches(self.romanizer, &c.city_name, &hint.city))
        {
            Some(city) => place.city_name = city.city_name.clone(),
            None => debug!(city = %hint.city, province = %province.province_short_name, "no city matched"),
        }
        place
    }

    /// Look the caller up and resolve the result. A failed lookup yields
    /// [`ResolvedPlace::failed`], never an error.
    pub fn resolve_auto(&self, lookup: &dyn GeoLookup) -> ResolvedPlace {
        match lookup.lookup() {
            Ok(hint) => self.resolve(&hint),
            Err(e) => {
                warn!("region lookup failed: {}", e);
                ResolvedPlace::failed()
            }
        }
    }

    /// Report names whose keys coincide within a level. Resolution assumes
    /// there are none; when there are, the first name in dataset order wins.
    pub fn key_collisions(&self) -> Vec<KeyCollision> {
        let mut out = collisions(
            None,
            self.snapshot.provinces.iter().map(|p| p.province_short_name.as_str()),
            self.romanizer,
        );
        for p in &self.snapshot.provinces {
            out.extend(collisions(
                Some(&p.province_short_name),
                p.cities.iter().map(|c| c.city_name.as_str()),
                self.romanizer,
            ));
        }
        out
    }

    /// Log every collision once; call after loading a snapshot.
    pub fn warn_on_collisions(&self) {
        for c in self.key_collisions() {
            warn!(
                province = c.province.as_deref().unwrap_or("-"),
                key = %c.key,
                "ambiguous transliteration key, '{}' wins over {:?}",
                c.names[0],
                &c.names[1..],
            );
        }
    }
}

fn collisions<'n>(
    province: Option<&str>,
    names: impl Iterator<Item = &'n str>,
    romanizer: &dyn Romanizer,
) -> Vec<KeyCollision> {
    let mut by_key: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for name in names {
        if let Some(key) = romanizer.romanize(name) {
            by_key.entry(key).or_default().push(name.to_string());
        }
    }
    by_key
        .into_iter()
        .filter(|(_, names)| names.len() > 1)
        .map(|(key, names)| KeyCollision {
            province: province.map(str::to_string),
            key,
            names,
        })
        .collect()
}
