//! News feed projection.

use crate::dataset::NewsRecord;
use chrono::TimeZone;
use chrono_tz::Asia::Shanghai;
use serde::Serialize;

const PUB_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub info_source: String,
    pub source_url: String,
    pub pub_time: String,
}

/// Either the single item for a province or the whole feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NewsSelection {
    One(NewsItem),
    All(Vec<NewsItem>),
}

/// Render a millisecond timestamp in the feed's local time (UTC+8).
/// Out-of-range timestamps render as an empty string.
pub fn pub_time(millis: i64) -> String {
    Shanghai
        .timestamp_millis_opt(millis)
        .single()
        .map(|t| t.format(PUB_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

pub fn simplify(records: &[NewsRecord], show_summary: bool) -> Vec<NewsItem> {
    records
        .iter()
        .map(|r| NewsItem {
            title: r.title.clone(),
            summary: show_summary.then(|| r.summary.clone()),
            info_source: r.info_source.clone(),
            source_url: r.source_url.clone(),
            pub_time: pub_time(r.pub_date),
        })
        .collect()
}

/// First item whose title mentions `province`.
pub fn for_province(items: &[NewsItem], province: &str) -> Option<NewsItem> {
    if province.is_empty() {
        return None;
    }
    items.iter().find(|n| n.title.contains(province)).cloned()
}

/// Falls back to the whole feed when no province is given or none matches.
pub fn select(records: &[NewsRecord], province: Option<&str>, show_summary: bool) -> NewsSelection {
    let items = simplify(records, show_summary);
    match province.and_then(|p| for_province(&items, p)) {
        Some(item) => NewsSelection::One(item),
        None => NewsSelection::All(items),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, pub_date: i64) -> NewsRecord {
        NewsRecord {
            title: title.into(),
            summary: "摘要".into(),
            info_source: "央视新闻".into(),
            source_url: "https://example.invalid/1".into(),
            pub_date,
            ..NewsRecord::default()
        }
    }

    #[test]
    fn test_pub_time_in_shanghai() {
        // 2022-01-01T00:00:00Z
        assert_eq!(pub_time(1_640_995_200_000), "2022-01-01 08:00:00");
    }

    #[test]
    fn test_simplify_drops_summary_on_request() {
        let recs = vec![record("北京新增病例", 0)];
        let with = simplify(&recs, true);
        assert_eq!(with[0].summary.as_deref(), Some("摘要"));
        let without = simplify(&recs, false);
        assert!(without[0].summary.is_none());
        let json = serde_json::to_value(&without[0]).unwrap();
        assert!(json.get("summary").is_none());
        assert_eq!(json["pubTime"], "1970-01-01 08:00:00");
    }

    #[test]
    fn test_for_province_first_mention() {
        let items = simplify(&[record("上海通报", 1), record("北京通报", 2), record("北京再通报", 3)], true);
        assert_eq!(for_province(&items, "北京").unwrap().title, "北京通报");
        assert!(for_province(&items, "广东").is_none());
        assert!(for_province(&items, "").is_none());
    }

    #[test]
    fn test_select_falls_back_to_feed() {
        let recs = vec![record("上海通报", 1), record("北京通报", 2)];
        assert!(matches!(select(&recs, Some("北京"), true), NewsSelection::One(_)));
        match select(&recs, Some("西藏"), true) {
            NewsSelection::All(items) => assert_eq!(items.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(select(&recs, None, false), NewsSelection::All(_)));
    }
}
