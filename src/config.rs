//! Settings file at ~/.epiatlas/settings.json.
//!
//! Every field has a default, so a partial file is valid and a missing file
//! is the same as an empty one. A file that exists but does not parse is an
//! error rather than a silent fallback.

use crate::error::{Error, Result};
use crate::location::providers::DEFAULT_LOOKUP_URL;
use crate::location::{PinyinRomanizer, GeoLookup, IpInfoLookup, OfflineLookup, PhraseOverrides};
use crate::naming::NamingPolicy;
use crate::timeline::HttpTimelineSource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Alpha-3 code of the country whose provinces and cities are matched phonetically.
    pub home_country: String,
    pub lookup_url: String,
    pub lookup_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub naming: NamingPolicy,
    pub romanization: PhraseOverrides,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            home_country: "CHN".to_string(),
            lookup_url: DEFAULT_LOOKUP_URL.to_string(),
            lookup_timeout_secs: 2,
            http_timeout_secs: 5,
            naming: NamingPolicy::default(),
            romanization: PhraseOverrides::default(),
        }
    }
}

fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".epiatlas")
}

pub fn default_settings_path() -> PathBuf {
    app_dir().join("settings.json")
}

pub fn default_snapshot_path() -> PathBuf {
    app_dir().join("snapshot.json")
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let settings: Settings = serde_json::from_str(&data)
            .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let code = &self.home_country;
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(Error::Configuration(format!(
                "home_country must be an uppercase alpha-3 code, got '{}'",
                code
            )));
        }
        if self.lookup_timeout_secs == 0 || self.http_timeout_secs == 0 {
            return Err(Error::Configuration("timeouts must be at least one second".into()));
        }
        for v in self.naming.audit() {
            warn!(entry = %v.entry, once = %v.once, twice = %v.twice, "naming table entry is not stable");
        }
        Ok(())
    }

    pub fn romanizer(&self) -> PinyinRomanizer {
        PinyinRomanizer::new(self.romanization.clone())
    }

    /// IP lookup, or a lookup that always fails when `offline`.
    pub fn geo_lookup(&self, offline: bool) -> Box<dyn GeoLookup> {
        if offline {
            Box::new(OfflineLookup)
        } else {
            Box::new(IpInfoLookup::new(
                self.lookup_url.clone(),
                Duration::from_secs(self.lookup_timeout_secs),
            ))
        }
    }

    pub fn timeline_source(&self) -> HttpTimelineSource {
        HttpTimelineSource::new(Duration::from_secs(self.http_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Romanizer;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let s = Settings::load(dir.path().join("nope.json")).unwrap();
        assert_eq!(s.home_country, "CHN");
        assert_eq!(s.lookup_timeout_secs, 2);
        assert_eq!(s.lookup_url, DEFAULT_LOOKUP_URL);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"home_country": "USA", "romanization": {"重庆": "chungking"}}"#).unwrap();
        let s = Settings::load(&path).unwrap();
        assert_eq!(s.home_country, "USA");
        assert_eq!(s.http_timeout_secs, 5);
        assert_eq!(s.romanizer().romanize("重庆").as_deref(), Some("chungking"));
        assert_eq!(s.naming.canonicalize("杭州"), "杭州市");
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Settings::load(&path), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let s = Settings {
            home_country: "cn".into(),
            ..Settings::default()
        };
        assert!(s.validate().is_err());

        let s = Settings {
            lookup_timeout_secs: 0,
            ..Settings::default()
        };
        assert!(s.validate().is_err());
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_offline_lookup_fails() {
        let s = Settings::default();
        assert!(s.geo_lookup(true).lookup().is_err());
    }

    #[test]
    fn test_default_paths_under_app_dir() {
        assert!(default_settings_path().ends_with(".epiatlas/settings.json"));
        assert!(default_snapshot_path().ends_with(".epiatlas/snapshot.json"));
    }
}
