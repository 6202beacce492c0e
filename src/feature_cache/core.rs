use crate::errors::GeoHausError;
use crate::geojson::{Feature, GeoJson};
use crate::metadata::{Metadata, now_millis};
use crate::options::CacheOptions;
use cache_system::{CacheConfig, CacheManager, HashStore, JsonFields};
use config::AppConfig;
use signal_system::{CacheEvent, EventType, SignalManager};
use std::sync::Arc;

/// Feature cache coordinating the feature and metadata records of each resource.
///
/// Both records live in the same backend under the same resource key, in two
/// different hashes. The backend is the only source of truth; nothing is
/// cached in process between calls.
pub struct FeatureCache<S: HashStore = CacheManager> {
    pub(crate) store: S,
    pub(crate) features_hash: String,
    pub(crate) metadata_hash: String,
    pub(crate) signal_manager: Option<Arc<SignalManager>>,
}

impl<S: HashStore> std::fmt::Debug for FeatureCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureCache")
            .field("store", &self.store)
            .field("features_hash", &self.features_hash)
            .field("metadata_hash", &self.metadata_hash)
            .field("has_signals", &self.has_signals())
            .finish()
    }
}

impl FeatureCache<CacheManager> {
    /// Create a Redis-backed feature cache. The connection opens on first use.
    pub fn new(config: CacheConfig) -> Result<Self, GeoHausError> {
        config.validate()?;
        let manager = CacheManager::new(config.clone())?;
        Ok(Self::with_store(manager, &config))
    }

    /// Create a Redis-backed feature cache from the `[cache]` section of an
    /// application config. `[logging]` is left to the host's subscriber setup.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, GeoHausError> {
        config.validate()?;
        Self::new(config.cache.clone())
    }
}

impl<S: HashStore> FeatureCache<S> {
    /// Create a feature cache over any backend, using the hash names from `config`
    pub fn with_store(store: S, config: &CacheConfig) -> Self {
        Self {
            store,
            features_hash: config.features_hash(),
            metadata_hash: config.metadata_hash(),
            signal_manager: None,
        }
    }

    pub fn with_signals(mut self, signal_manager: Arc<SignalManager>) -> Self {
        self.signal_manager = Some(signal_manager);
        self
    }

    /// Set signal manager for this cache
    pub fn set_signal_manager(&mut self, signal_manager: Arc<SignalManager>) {
        self.signal_manager = Some(signal_manager);
    }

    /// Remove signal manager from this cache
    pub fn remove_signal_manager(&mut self) {
        self.signal_manager = None;
    }

    /// Check if signal manager is set
    pub fn has_signals(&self) -> bool {
        self.signal_manager.is_some()
    }

    /// The underlying backend
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn features_hash(&self) -> &str {
        &self.features_hash
    }

    pub fn metadata_hash(&self) -> &str {
        &self.metadata_hash
    }

    /// Check backend connectivity
    pub async fn ping(&self) -> Result<String, GeoHausError> {
        Ok(self.store.ping().await?)
    }

    pub(crate) fn emit_signal(&self, event: CacheEvent) {
        if let Some(signal_manager) = &self.signal_manager {
            signal_manager.emit(event);
        }
    }

    pub(crate) async fn features_exist(&self, key: &str) -> Result<bool, GeoHausError> {
        Ok(self.store.field_exists(&self.features_hash, key).await?)
    }

    pub(crate) async fn read_metadata(&self, key: &str) -> Result<Option<Metadata>, GeoHausError> {
        let metadata: Option<Metadata> = self.store.get_field(&self.metadata_hash, key).await?;
        Ok(metadata)
    }

    pub(crate) async fn write_metadata(
        &self,
        key: &str,
        metadata: &Metadata,
    ) -> Result<(), GeoHausError> {
        Ok(self
            .store
            .set_field(&self.metadata_hash, key, metadata)
            .await?)
    }

    /// Write a brand-new resource. The caller has already checked that no
    /// feature record exists.
    pub(crate) async fn write_new(
        &self,
        key: &str,
        geojson: GeoJson,
        options: &CacheOptions,
    ) -> Result<Metadata, GeoHausError> {
        let feature_count = geojson.features.len();
        self.store
            .set_field(&self.features_hash, key, &geojson.features)
            .await?;

        let now = now_millis();
        let mut metadata = geojson.metadata.unwrap_or_default();
        if let Some(expires) = options.expires_at(now) {
            metadata.set_expires(expires);
        }
        metadata.set_updated(now);
        self.write_metadata(key, &metadata).await?;

        crate::debug_log!("[INSERT] key={} features={}", key, feature_count);
        self.emit_signal(CacheEvent::new(EventType::Insert, key).with_feature_count(feature_count));
        Ok(metadata)
    }

    /// Replace the features of an existing resource. The caller has already
    /// checked that a feature record exists.
    pub(crate) async fn overwrite(
        &self,
        key: &str,
        geojson: GeoJson,
        options: &CacheOptions,
    ) -> Result<Metadata, GeoHausError> {
        let feature_count = geojson.features.len();
        self.store
            .set_field(&self.features_hash, key, &geojson.features)
            .await?;

        let mut metadata = match geojson.metadata {
            Some(metadata) => metadata,
            None => self.read_metadata(key).await?.unwrap_or_else(|| {
                tracing::warn!(key, "Metadata record missing for cached features, recreating");
                Metadata::new()
            }),
        };
        let now = now_millis();
        if let Some(expires) = options.expires_at(now) {
            metadata.set_expires(expires);
        }
        metadata.set_updated(now);
        self.write_metadata(key, &metadata).await?;

        crate::debug_log!("[UPDATE] key={} features={}", key, feature_count);
        self.emit_signal(CacheEvent::new(EventType::Update, key).with_feature_count(feature_count));
        Ok(metadata)
    }

    /// Deep-merge `update` into the stored metadata and refresh `updated`.
    ///
    /// A missing record is replaced by `fallback` when given, otherwise the
    /// merge fails with `NotFound`.
    pub(crate) async fn merge_metadata(
        &self,
        key: &str,
        update: Metadata,
        fallback: Option<Metadata>,
    ) -> Result<Metadata, GeoHausError> {
        let mut metadata = match (self.read_metadata(key).await?, fallback) {
            (Some(existing), _) => existing,
            (None, Some(fallback)) => fallback,
            (None, None) => return Err(GeoHausError::not_found(key)),
        };
        metadata.merge(update);
        metadata.set_updated(now_millis());
        self.write_metadata(key, &metadata).await?;
        Ok(metadata)
    }

    /// Read the stored features for an append. An absent record fails the
    /// read itself; there is no separate existence guard.
    pub(crate) async fn read_features_for_append(
        &self,
        key: &str,
    ) -> Result<Vec<Feature>, GeoHausError> {
        let features: Option<Vec<Feature>> = self.store.get_field(&self.features_hash, key).await?;
        features.ok_or_else(|| GeoHausError::not_found(key))
    }
}
