//! Per-province and per-country case timelines.
//!
//! Each province and country record carries a `statisticsData` URL pointing
//! at a `{code, data}` document. A `code` other than `"success"` is a data
//! integrity error; transport failures are network errors.

use crate::dataset::{Counts, NameScheme, Snapshot};
use crate::error::{Error, Result};
use crate::location::providers::USER_AGENT;
use chrono::{Datelike, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const SUCCESS: &str = "success";

/// One day of a timeline, reduced to the four count fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    /// Date as `yyyymmdd`.
    pub date_id: u32,
    #[serde(flatten)]
    pub counts: Counts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub name: String,
    pub data: Vec<TimelinePoint>,
}

#[derive(Deserialize)]
struct RawTimeline {
    code: String,
    #[serde(default)]
    data: Vec<TimelinePoint>,
}

/// Fetches the body behind a `statisticsData` URL.
pub trait TimelineSource: Send + Sync {
    fn fetch_body(&self, url: &str) -> Result<String>;
}

/// HTTP source with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpTimelineSource {
    timeout: Duration,
}

impl HttpTimelineSource {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl TimelineSource for HttpTimelineSource {
    fn fetch_body(&self, url: &str) -> Result<String> {
        debug!(url, "fetching timeline");
        ureq::get(url)
            .set("User-Agent", USER_AGENT)
            .timeout(self.timeout)
            .call()
            .map_err(|e| Error::Network(e.to_string()))?
            .into_string()
            .map_err(Error::from)
    }
}

pub fn parse_timeline(body: &str) -> Result<Vec<TimelinePoint>> {
    let raw: RawTimeline = serde_json::from_str(body)?;
    if raw.code != SUCCESS {
        return Err(Error::DataIntegrity { code: raw.code });
    }
    Ok(raw.data)
}

/// Today in the host's local time, which is what `dateId` values count in.
/// The CLI and the server both take "today" from here.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn date_id(date: NaiveDate) -> u32 {
    date.year().max(0) as u32 * 10_000 + date.month() * 100 + date.day()
}

/// Points dated no earlier than `days` before `today`.
pub fn window(points: &[TimelinePoint], days: u32, today: NaiveDate) -> Vec<TimelinePoint> {
    let start = today
        .checked_sub_days(Days::new(days.into()))
        .unwrap_or(NaiveDate::MIN);
    let cutoff = date_id(start);
    points.iter().filter(|p| p.date_id >= cutoff).copied().collect()
}

fn with_today(points: &[TimelinePoint], days: u32, today: NaiveDate, current: Counts) -> Vec<TimelinePoint> {
    let mut data = window(points, days, today);
    data.push(TimelinePoint {
        date_id: date_id(today),
        counts: current,
    });
    data
}

/// The last `days` of a province's timeline, ending with today's counts.
pub fn province_timeline(
    snapshot: &Snapshot,
    source: &dyn TimelineSource,
    name: &str,
    days: u32,
    today: NaiveDate,
) -> Result<Timeline> {
    let p = snapshot
        .province(name)
        .ok_or_else(|| Error::NotFound(format!("province '{}'", name)))?;
    let points = parse_timeline(&source.fetch_body(&p.statistics_data)?)?;
    Ok(Timeline {
        name: p.province_short_name.clone(),
        data: with_today(&points, days, today, p.counts),
    })
}

pub fn country_timeline(
    snapshot: &Snapshot,
    source: &dyn TimelineSource,
    name: &str,
    scheme: NameScheme,
    days: u32,
    today: NaiveDate,
) -> Result<Timeline> {
    let c = snapshot
        .country_by_name(name, scheme)
        .ok_or_else(|| Error::NotFound(format!("country '{}'", name)))?;
    let points = parse_timeline(&source.fetch_body(&c.statistics_data)?)?;
    Ok(Timeline {
        name: name.to_string(),
        data: with_today(&points, days, today, c.counts),
    })
}
