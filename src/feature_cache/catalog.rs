use super::core::FeatureCache;
use crate::errors::{GeoHausError, RecordKind};
use crate::metadata::{Metadata, now_millis};
use crate::traits::CatalogStore;
use async_trait::async_trait;
use cache_system::{HashStore, JsonFields};
use signal_system::{CacheEvent, EventType};

#[async_trait]
impl<S: HashStore> CatalogStore for FeatureCache<S> {
    async fn catalog_insert(
        &self,
        key: &str,
        mut metadata: Metadata,
    ) -> Result<Metadata, GeoHausError> {
        if self.store.field_exists(&self.metadata_hash, key).await? {
            return Err(GeoHausError::already_exists(RecordKind::Catalog, key));
        }
        metadata.set_updated(now_millis());
        self.write_metadata(key, &metadata).await?;

        self.emit_signal(CacheEvent::new(EventType::CatalogInsert, key));
        Ok(metadata)
    }

    async fn catalog_update(&self, key: &str, update: Metadata) -> Result<Metadata, GeoHausError> {
        let metadata = self.merge_metadata(key, update, None).await?;

        self.emit_signal(CacheEvent::new(EventType::CatalogUpdate, key));
        Ok(metadata)
    }

    async fn catalog_retrieve(&self, key: &str) -> Result<Metadata, GeoHausError> {
        self.read_metadata(key)
            .await?
            .ok_or_else(|| GeoHausError::not_found(key))
    }

    async fn catalog_delete(&self, key: &str) -> Result<bool, GeoHausError> {
        // Data must leave the cache before its catalog entry does.
        if self.features_exist(key).await? {
            return Err(GeoHausError::conflict(key));
        }
        let removed = self.store.delete_field(&self.metadata_hash, key).await?;

        crate::debug_log!("[CATALOG_DELETE] key={} removed={}", key, removed);
        if removed {
            self.emit_signal(CacheEvent::new(EventType::CatalogDelete, key));
        }
        Ok(removed)
    }
}
