//! Geolocation providers: IP lookup over HTTP and an offline stand-in.

use super::types::{GeoHint, LookupError};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_LOOKUP_URL: &str = "https://ipinfo.io/json";

pub(crate) const USER_AGENT: &str = concat!("epiatlas/", env!("CARGO_PKG_VERSION"));

/// Source of the caller's free-text location.
pub trait GeoLookup: Send + Sync {
    fn lookup(&self) -> Result<GeoHint, LookupError>;
}

// ─── IP-based geolocation ───────────────────────────────────────

#[derive(Deserialize)]
struct IpInfoResult {
    country: Option<String>,
    region: Option<String>,
    city: Option<String>,
}

/// Looks up the caller's location from its public IP.
///
/// The request is bounded by `timeout`; a slow service is a failed lookup.
#[derive(Debug, Clone)]
pub struct IpInfoLookup {
    url: String,
    timeout: Duration,
}

impl IpInfoLookup {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

impl Default for IpInfoLookup {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_URL, Duration::from_secs(2))
    }
}

impl GeoLookup for IpInfoLookup {
    fn lookup(&self) -> Result<GeoHint, LookupError> {
        let response = ureq::get(&self.url)
            .set("User-Agent", USER_AGENT)
            .timeout(self.timeout)
            .call()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let body: IpInfoResult = response
            .into_json()
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))?;

        hint_from_result(body)
    }
}

fn hint_from_result(r: IpInfoResult) -> Result<GeoHint, LookupError> {
    let country = r
        .country
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| LookupError::InvalidResponse("no country".into()))?;

    Ok(GeoHint {
        country: country.trim().to_string(),
        region: r.region.unwrap_or_default(),
        city: r.city.unwrap_or_default(),
    })
}

// ─── Offline ────────────────────────────────────────────────────

/// Always fails; used when network access is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineLookup;

impl GeoLookup for OfflineLookup {
    fn lookup(&self) -> Result<GeoHint, LookupError> {
        Err(LookupError::Offline)
    }
}

/// Returns the same hint every time. Handy when the caller already knows
/// where it is.
#[derive(Debug, Clone)]
pub struct FixedLookup(pub GeoHint);

impl GeoLookup for FixedLookup {
    fn lookup(&self) -> Result<GeoHint, LookupError> {
        Ok(self.0.clone())
    }
}
