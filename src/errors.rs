//! Error types for the GeoHaus crate
//!
//! This module contains all error types that can be returned by feature cache
//! and catalog operations.

use cache_system::CacheError;
use config::ConfigError;
use std::fmt;
use thiserror::Error;

/// Which of the two per-resource records an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Features,
    Catalog,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Features => f.write_str("Cache"),
            RecordKind::Catalog => f.write_str("Catalog"),
        }
    }
}

#[derive(Error, Debug)]
pub enum GeoHausError {
    #[error("{kind} key is already in use")]
    AlreadyExists { kind: RecordKind, key: String },

    #[error("Resource not found")]
    NotFound { key: String },

    #[error("Cannot delete catalog entry while data is still in cache")]
    Conflict { key: String },

    #[error("Streaming not yet supported")]
    NotSupported,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache store error: {0}")]
    Store(#[source] CacheError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl GeoHausError {
    pub fn already_exists(kind: RecordKind, key: &str) -> Self {
        Self::AlreadyExists {
            kind,
            key: key.to_string(),
        }
    }

    pub fn not_found(key: &str) -> Self {
        Self::NotFound {
            key: key.to_string(),
        }
    }

    pub fn conflict(key: &str) -> Self {
        Self::Conflict {
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Resource key the error is about, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::AlreadyExists { key, .. } | Self::NotFound { key } | Self::Conflict { key } => {
                Some(key)
            }
            _ => None,
        }
    }
}

/// Unparseable stored JSON stays distinguishable from backend failures.
impl From<CacheError> for GeoHausError {
    fn from(error: CacheError) -> Self {
        match error {
            CacheError::SerializationError(e) => Self::Serialization(e),
            other => Self::Store(other),
        }
    }
}
