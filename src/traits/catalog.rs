//! Catalog trait definitions
//!
//! Direct management of metadata records, independent of feature data.

use crate::errors::GeoHausError;
use crate::metadata::Metadata;
use async_trait::async_trait;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Create a metadata record; fails with `AlreadyExists` if one is present
    async fn catalog_insert(&self, key: &str, metadata: Metadata)
        -> Result<Metadata, GeoHausError>;

    /// Deep-merge `update` into the existing record; fails with `NotFound` if absent
    async fn catalog_update(&self, key: &str, update: Metadata) -> Result<Metadata, GeoHausError>;

    async fn catalog_retrieve(&self, key: &str) -> Result<Metadata, GeoHausError>;

    /// Remove the metadata record. Fails with `Conflict` while features are
    /// still cached for `key`; returns whether a record was removed.
    async fn catalog_delete(&self, key: &str) -> Result<bool, GeoHausError>;
}
