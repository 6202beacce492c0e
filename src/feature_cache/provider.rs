//! Feature cache operations
//!
//! Existence checks act as the guard for each operation; see
//! [`CacheProvider`] for the write ordering.

use super::core::FeatureCache;
use crate::errors::{GeoHausError, RecordKind};
use crate::geojson::{Feature, FeatureCollection, GeoJson};
use crate::metadata::{Metadata, STATUS_DELETED};
use crate::options::CacheOptions;
use crate::traits::{CacheProvider, FeatureStream};
use async_trait::async_trait;
use cache_system::{CacheError, HashStore, JsonFields};
use signal_system::{CacheEvent, EventType};

#[async_trait]
impl<S: HashStore> CacheProvider for FeatureCache<S> {
    const NAME: &'static str = "Redis Cache";
    const TYPE: &'static str = "cache";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    async fn insert(
        &self,
        key: &str,
        geojson: GeoJson,
        options: &CacheOptions,
    ) -> Result<Metadata, GeoHausError> {
        if self.features_exist(key).await? {
            return Err(GeoHausError::already_exists(RecordKind::Features, key));
        }
        self.write_new(key, geojson, options).await
    }

    async fn update(
        &self,
        key: &str,
        geojson: GeoJson,
        options: &CacheOptions,
    ) -> Result<Metadata, GeoHausError> {
        if !self.features_exist(key).await? {
            return Err(GeoHausError::not_found(key));
        }
        self.overwrite(key, geojson, options).await
    }

    async fn upsert(
        &self,
        key: &str,
        geojson: GeoJson,
        options: &CacheOptions,
    ) -> Result<Metadata, GeoHausError> {
        // One check decides the branch; a concurrent insert or delete between
        // the check and the write is not detected.
        if self.features_exist(key).await? {
            self.overwrite(key, geojson, options).await
        } else {
            self.write_new(key, geojson, options).await
        }
    }

    async fn append(
        &self,
        key: &str,
        geojson: GeoJson,
        _options: &CacheOptions,
    ) -> Result<Metadata, GeoHausError> {
        let existing = self.read_features_for_append(key).await?;

        let mut features = geojson.features;
        features.extend(existing);
        self.store
            .set_field(&self.features_hash, key, &features)
            .await?;

        // Only `updated` changes; expiration and other fields are left alone.
        let metadata = self.merge_metadata(key, Metadata::new(), None).await?;

        crate::debug_log!("[APPEND] key={} features={}", key, features.len());
        self.emit_signal(CacheEvent::new(EventType::Append, key).with_feature_count(features.len()));
        Ok(metadata)
    }

    async fn retrieve(
        &self,
        key: &str,
        _options: &CacheOptions,
    ) -> Result<FeatureCollection, GeoHausError> {
        let read: Result<Option<Vec<Feature>>, CacheError> =
            self.store.get_field(&self.features_hash, key).await;
        let features = match read {
            Ok(Some(features)) => features,
            Ok(None) => return Err(GeoHausError::not_found(key)),
            Err(CacheError::SerializationError(e)) => return Err(GeoHausError::Serialization(e)),
            Err(e) => {
                // Backend failures on the feature read are reported as a miss.
                tracing::warn!(key, error = %e, "Feature read failed, reporting resource as not found");
                return Err(GeoHausError::not_found(key));
            }
        };

        let metadata = self.read_metadata(key).await?.unwrap_or_default();
        Ok(FeatureCollection::new(metadata, features))
    }

    async fn delete(&self, key: &str) -> Result<Metadata, GeoHausError> {
        if !self.features_exist(key).await? {
            return Err(GeoHausError::not_found(key));
        }
        self.store.delete_field(&self.features_hash, key).await?;

        let mut update = Metadata::new();
        update.set_status(STATUS_DELETED);
        let metadata = self
            .merge_metadata(key, update, Some(Metadata::new()))
            .await?;

        crate::debug_log!("[DELETE] key={}", key);
        self.emit_signal(CacheEvent::new(EventType::Delete, key).with_feature_count(0));
        Ok(metadata)
    }

    fn create_stream(
        &self,
        _key: &str,
        _options: &CacheOptions,
    ) -> Result<FeatureStream, GeoHausError> {
        Err(GeoHausError::NotSupported)
    }

    async fn disconnect(&self) -> Result<bool, GeoHausError> {
        Ok(self.store.disconnect().await?)
    }
}
