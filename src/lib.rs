//! Epiatlas: phonetic region resolution, city-name canonicalization and
//! danger-zone rollups over an epidemic province/city snapshot.

pub mod atlas;
pub mod config;
pub mod danger;
pub mod dataset;
pub mod error;
pub mod location;
pub mod naming;
pub mod news;
pub mod server;
pub mod summary;
pub mod timeline;

pub use error::{Error, Result};
