//! Crate-wide error type.
//!
//! Geolocation failures are not represented here: they are absorbed by the
//! region resolver and surface as the `"Failed"` sentinel instead.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Unusable options, settings or arguments.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// An upstream record carried a non-success status code.
    #[error("Upstream data error, status code: {code}")]
    DataIntegrity { code: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
