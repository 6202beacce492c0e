//! Traits for cache operations
//!
//! This module contains the traits that define the interface a host data
//! service uses to talk to a GeoHaus cache provider.

pub mod catalog;
pub mod provider;

// Re-export all public items for convenience
pub use catalog::CatalogStore;
pub use provider::{CacheProvider, FeatureStream};
