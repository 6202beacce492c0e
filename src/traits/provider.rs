//! Trait definitions
//!
//! This module defines the feature cache operations exposed to the host.

use crate::errors::GeoHausError;
use crate::geojson::{Feature, FeatureCollection, GeoJson};
use crate::metadata::Metadata;
use crate::options::CacheOptions;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Stream of features, reserved for streaming retrieval
pub type FeatureStream = BoxStream<'static, Result<Feature, GeoHausError>>;

/// Cache provider contract.
///
/// Every operation checks feature-record existence first, then writes the
/// feature record before the metadata record. No operation is atomic across
/// those writes.
#[async_trait]
pub trait CacheProvider: Send + Sync {
    /// Provider name used for discovery by the host
    const NAME: &'static str;

    /// Provider kind; always `"cache"`
    const TYPE: &'static str;

    const VERSION: &'static str;

    /// Store a new resource. Fails with `AlreadyExists` if features are already cached for `key`.
    async fn insert(
        &self,
        key: &str,
        geojson: GeoJson,
        options: &CacheOptions,
    ) -> Result<Metadata, GeoHausError>;

    /// Replace the features of an existing resource. Metadata is replaced when
    /// supplied, otherwise the stored record is kept and its timestamps refreshed.
    async fn update(
        &self,
        key: &str,
        geojson: GeoJson,
        options: &CacheOptions,
    ) -> Result<Metadata, GeoHausError>;

    /// `update` if features exist for `key`, `insert` otherwise
    async fn upsert(
        &self,
        key: &str,
        geojson: GeoJson,
        options: &CacheOptions,
    ) -> Result<Metadata, GeoHausError>;

    /// Prepend new features to the stored ones and refresh `updated`
    async fn append(
        &self,
        key: &str,
        geojson: GeoJson,
        options: &CacheOptions,
    ) -> Result<Metadata, GeoHausError>;

    /// Read features plus metadata as a feature collection
    async fn retrieve(
        &self,
        key: &str,
        options: &CacheOptions,
    ) -> Result<FeatureCollection, GeoHausError>;

    /// Remove the features and mark the catalog entry as deleted
    async fn delete(&self, key: &str) -> Result<Metadata, GeoHausError>;

    /// Streaming retrieval. Not supported; always fails with `NotSupported`.
    fn create_stream(
        &self,
        key: &str,
        options: &CacheOptions,
    ) -> Result<FeatureStream, GeoHausError>;

    /// Close the store connection. Returns `false` if it was already closed.
    async fn disconnect(&self) -> Result<bool, GeoHausError>;
}
