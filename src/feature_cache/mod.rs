//! Feature cache coordinator
//!
//! [`FeatureCache`] implements [`CacheProvider`](crate::traits::CacheProvider)
//! and [`CatalogStore`](crate::traits::CatalogStore) over any
//! [`HashStore`](cache_system::HashStore) backend.

pub mod catalog;
pub mod core;
pub mod provider;

pub use core::FeatureCache;
