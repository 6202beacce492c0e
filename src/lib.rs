//! # GeoHaus
//!
//! A Redis-backed cache provider for GeoJSON feature collections and their
//! catalog metadata.
//!
//! Each resource key owns two records in the store: its features and its
//! metadata. [`FeatureCache`] keeps them coherent across insert, update,
//! upsert, append and delete by guarding every operation with an existence
//! check and always writing features before metadata.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use geohaus::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = Arc::new(FeatureCache::new(CacheConfig::new(
//!         "redis://localhost:6379".to_string(),
//!     ))?);
//!     let _shutdown = cache.clone().disconnect_on_shutdown();
//!
//!     let geojson = GeoJson::try_from(json!({
//!         "type": "FeatureCollection",
//!         "metadata": {"name": "Trailheads"},
//!         "features": [{"type": "Feature", "properties": {"id": 1}, "geometry": null}]
//!     }))?;
//!
//!     cache.insert("trailheads", geojson, &CacheOptions::with_ttl(600)).await?;
//!     let cached = cache.retrieve("trailheads", &CacheOptions::default()).await?;
//!     println!("{} features, expires at {:?}", cached.features.len(), cached.metadata.expires());
//!
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

pub mod errors;
pub mod feature_cache;
pub mod geojson;
pub mod merge;
pub mod metadata;
pub mod options;
pub mod prelude;
pub mod shutdown;
pub mod traits;

// Re-export the main public types for convenience
pub use errors::{GeoHausError, RecordKind};
pub use feature_cache::FeatureCache;
pub use geojson::{Feature, FeatureCollection, GeoJson};
pub use metadata::Metadata;
pub use options::CacheOptions;
pub use traits::{CacheProvider, CatalogStore, FeatureStream};

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, LoggingConfig};

// Re-export internal crates used in the public API
pub use cache_system;
pub use signal_system;

pub use async_trait;
