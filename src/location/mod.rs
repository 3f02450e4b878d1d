//! Location subsystem.
//!
//! Turns a free-text geolocation hint into a dataset-native
//! (country, province, city) triple via phonetic name matching.

pub mod iso;
pub mod providers;
pub mod resolver;
pub mod romanize;
pub mod types;

pub use providers::{FixedLookup, GeoLookup, IpInfoLookup, OfflineLookup};
pub use resolver::{KeyCollision, RegionResolver};
pub use romanize::{PinyinRomanizer, PhraseOverrides, Romanizer};
pub use types::{GeoHint, LookupError, ResolvedPlace, FAILED};
