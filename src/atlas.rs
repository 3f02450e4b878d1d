//! Query front end shared by the CLI and the HTTP server.
//!
//! Owns the loaded snapshot together with the settings-derived collaborators
//! (romanizer, geolocation lookup, timeline source). The literal name `auto`
//! in a country, province or city argument stands for the caller's own place.

use crate::config::Settings;
use crate::danger::{self, CityDangerDetail, DangerOptions, DangerReport, ProvinceDangerDetail};
use crate::dataset::{NameScheme, Snapshot};
use crate::error::{Error, Result};
use crate::location::{PinyinRomanizer, GeoLookup, RegionResolver, ResolvedPlace};
use crate::news::{self, NewsSelection};
use crate::summary::{self, CitySummary, CountrySummary, ProvinceSummary};
use crate::timeline::{self, Timeline, TimelineSource};
use chrono::NaiveDate;
use serde::Serialize;

pub const AUTO: &str = "auto";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProvinceView {
    Summary(ProvinceSummary),
    Timeline(Timeline),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CountryView {
    Summary(CountrySummary),
    Timeline(Timeline),
}

pub struct Atlas {
    snapshot: Snapshot,
    settings: Settings,
    romanizer: PinyinRomanizer,
    lookup: Box<dyn GeoLookup>,
    timelines: Box<dyn TimelineSource>,
}

impl Atlas {
    pub fn new(
        snapshot: Snapshot,
        settings: Settings,
        lookup: Box<dyn GeoLookup>,
        timelines: Box<dyn TimelineSource>,
    ) -> Self {
        let romanizer = settings.romanizer();
        Self {
            snapshot,
            settings,
            romanizer,
            lookup,
            timelines,
        }
    }

    /// Wire the network collaborators from `settings`.
    pub fn from_settings(snapshot: Snapshot, settings: Settings, offline: bool) -> Self {
        let lookup = settings.geo_lookup(offline);
        let timelines = Box::new(settings.timeline_source());
        Self::new(snapshot, settings, lookup, timelines)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn resolver(&self) -> RegionResolver<'_> {
        RegionResolver::new(&self.snapshot, &self.romanizer, &self.settings.home_country)
    }

    pub fn region(&self) -> ResolvedPlace {
        self.resolver().resolve_auto(self.lookup.as_ref())
    }

    pub fn danger(&self, options: DangerOptions) -> Result<DangerReport> {
        danger::aggregate(&self.snapshot, &self.settings.naming, options)
    }

    pub fn detail(&self) -> Vec<ProvinceDangerDetail> {
        danger::detail(&self.snapshot, &self.settings.naming)
    }

    pub fn city_detail(&self, province: Option<&str>, city: &str) -> Result<CityDangerDetail> {
        if city == AUTO {
            danger::city_detail_auto(&self.snapshot, &self.settings.naming, &self.resolver(), self.lookup.as_ref())
        } else {
            danger::city_detail(&self.snapshot, &self.settings.naming, province, city)
        }
    }

    pub fn provinces(&self, include_cities: bool) -> Vec<ProvinceSummary> {
        summary::national(&self.snapshot, &self.settings.naming, include_cities)
    }

    fn own_province(&self) -> Result<String> {
        self.region()
            .province()
            .map(str::to_string)
            .ok_or_else(|| Error::NotFound("current province could not be resolved".into()))
    }

    /// A province's counts, or its timeline over the last `days`.
    pub fn province(&self, name: &str, days: Option<u32>, today: NaiveDate) -> Result<ProvinceView> {
        let name = if name == AUTO { self.own_province()? } else { name.to_string() };
        match days {
            Some(days) => {
                timeline::province_timeline(&self.snapshot, self.timelines.as_ref(), &name, days, today)
                    .map(ProvinceView::Timeline)
            }
            None => summary::province(&self.snapshot, &name).map(ProvinceView::Summary),
        }
    }

    pub fn city(&self, province: &str, city: &str, include_danger_counts: bool) -> Result<CitySummary> {
        if city != AUTO {
            return summary::city(&self.snapshot, province, city, include_danger_counts);
        }
        let place = self.region();
        match (place.province(), place.city()) {
            (Some(p), Some(c)) => summary::city(&self.snapshot, p, c, include_danger_counts),
            _ => Err(Error::NotFound("current city could not be resolved".into())),
        }
    }

    /// The caller's country under `scheme`. The resolver reports the native
    /// label for the home country and the full name for any other.
    fn own_country(&self, scheme: NameScheme) -> Result<String> {
        let place = self.region();
        let unresolved = || Error::NotFound("current country could not be resolved".into());
        if place.is_failed() || place.country_name.is_empty() {
            return Err(unresolved());
        }
        let record = [NameScheme::Native, NameScheme::Latin]
            .into_iter()
            .find_map(|s| self.snapshot.country_by_name(&place.country_name, s))
            .ok_or_else(unresolved)?;
        Ok(match scheme {
            NameScheme::Native => record.province_name.clone(),
            NameScheme::Latin => record.country_full_name.clone(),
        })
    }

    pub fn world(&self, scheme: NameScheme) -> Vec<CountrySummary> {
        summary::world(&self.snapshot, scheme)
    }

    pub fn country(
        &self,
        name: &str,
        scheme: NameScheme,
        days: Option<u32>,
        today: NaiveDate,
    ) -> Result<CountryView> {
        let name = if name == AUTO { self.own_country(scheme)? } else { name.to_string() };
        let name = name.as_str();
        match days {
            Some(days) => timeline::country_timeline(&self.snapshot, self.timelines.as_ref(), name, scheme, days, today)
                .map(CountryView::Timeline),
            None => summary::country(&self.snapshot, name, scheme).map(CountryView::Summary),
        }
    }

    /// News for one province (or the caller's own with `auto`), falling back
    /// to the whole feed.
    pub fn news(&self, province: Option<&str>, show_summary: bool) -> NewsSelection {
        let own;
        let province = match province {
            Some(AUTO) => {
                own = self.own_province().ok();
                own.as_deref()
            }
            other => other,
        };
        news::select(&self.snapshot.news, province, show_summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{City, Counts, NewsRecord, Province, WorldRecord};
    use crate::location::{FixedLookup, GeoHint, OfflineLookup};

    struct Canned;

    impl TimelineSource for Canned {
        fn fetch_body(&self, _url: &str) -> Result<String> {
            Ok(r#"{"code":"success","data":[{"dateId":20220110,"confirmedCount":3}]}"#.into())
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            provinces: vec![Province {
                province_name: "上海市".into(),
                province_short_name: "上海".into(),
                counts: Counts { confirmed_count: 9, ..Counts::default() },
                cities: vec![City {
                    city_name: "杨浦区".into(),
                    high_danger_count: 1,
                    ..City::default()
                }],
                ..Province::default()
            }],
            countries: vec![WorldRecord {
                country_short_code: "CHN".into(),
                country_full_name: "China".into(),
                province_name: "中国".into(),
                ..WorldRecord::default()
            }],
            news: vec![
                NewsRecord { title: "北京通报".into(), ..NewsRecord::default() },
                NewsRecord { title: "上海通报".into(), ..NewsRecord::default() },
            ],
        }
    }

    fn atlas(lookup: Box<dyn GeoLookup>) -> Atlas {
        Atlas::new(snapshot(), Settings::default(), lookup, Box::new(Canned))
    }

    fn located() -> Atlas {
        atlas(Box::new(FixedLookup(GeoHint::new("CN", "Shanghai", "Yangpuqu"))))
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, 15).unwrap()
    }

    #[test]
    fn test_region_resolves_through_lookup() {
        let place = located().region();
        assert_eq!(place.country_name, "中国");
        assert_eq!(place.province_name, "上海");
        assert_eq!(place.city_name, "杨浦区");
    }

    #[test]
    fn test_offline_region_is_failed() {
        assert!(atlas(Box::new(OfflineLookup)).region().is_failed());
    }

    #[test]
    fn test_auto_province_and_city() {
        let a = located();
        match a.province(AUTO, None, today()).unwrap() {
            ProvinceView::Summary(s) => assert_eq!(s.counts.confirmed_count, 9),
            other => panic!("unexpected {:?}", other),
        }
        let city = a.city("", AUTO, true).unwrap();
        assert_eq!(city.high_danger_count, Some(1));
    }

    #[test]
    fn test_auto_without_location_is_not_found() {
        let a = atlas(Box::new(OfflineLookup));
        assert!(matches!(a.province(AUTO, None, today()), Err(Error::NotFound(_))));
        assert!(matches!(a.city("上海", AUTO, false), Err(Error::NotFound(_))));
        assert!(matches!(a.news(Some(AUTO), true), NewsSelection::All(_)));
        assert!(matches!(a.country(AUTO, NameScheme::Native, None, today()), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_auto_country_under_both_schemes() {
        let a = located();
        match a.country(AUTO, NameScheme::Native, None, today()).unwrap() {
            CountryView::Summary(c) => assert_eq!(c.country_name, "中国"),
            other => panic!("unexpected {:?}", other),
        }
        match a.country(AUTO, NameScheme::Latin, None, today()).unwrap() {
            CountryView::Summary(c) => assert_eq!(c.country_name, "China"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_province_timeline_view() {
        match located().province("上海", Some(30), today()).unwrap() {
            ProvinceView::Timeline(t) => assert_eq!(t.data.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_news_for_own_province() {
        match located().news(Some(AUTO), false) {
            NewsSelection::One(item) => assert_eq!(item.title, "上海通报"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
