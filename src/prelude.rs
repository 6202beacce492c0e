//! Convenience re-exports for common GeoHaus usage
//!
//! # Example
//!
//! ```rust
//! use geohaus::prelude::*;
//!
//! // Now you have access to the feature cache, its traits and payload types
//! ```

// Core GeoHaus components
pub use crate::errors::{GeoHausError, RecordKind};
pub use crate::feature_cache::FeatureCache;
pub use crate::geojson::{Feature, FeatureCollection, GeoJson};
pub use crate::metadata::{Metadata, STATUS_DELETED};
pub use crate::options::CacheOptions;
pub use crate::shutdown::shutdown_signal;
pub use crate::traits::{CacheProvider, CatalogStore, FeatureStream};

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, LoggingConfig};

// Storage backends
pub use cache_system::prelude::*;

// Change notifications
pub use signal_system::prelude::*;

// Common external dependencies
pub use std::sync::Arc;
