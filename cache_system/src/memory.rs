//! In-process hash-field store.
//!
//! Mirrors the Redis hash semantics closely enough for tests and for
//! embedders that do not run Redis. Each command takes the lock once, so,
//! like Redis, individual reads and writes are serialized but sequences of
//! them are not atomic.

use crate::errors::CacheError;
use crate::store::HashStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryHashStore {
    hashes: RwLock<HashMap<String, HashMap<String, String>>>,
    closed: AtomicBool,
}

impl MemoryHashStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<(), CacheError> {
        if self.closed.load(Ordering::Acquire) {
            Err(CacheError::Disconnected)
        } else {
            Ok(())
        }
    }

    /// Number of fields stored under `hash`
    pub async fn field_count(&self, hash: &str) -> usize {
        self.hashes.read().await.get(hash).map_or(0, HashMap::len)
    }
}

#[async_trait]
impl HashStore for MemoryHashStore {
    async fn hset(&self, hash: &str, field: &str, value: &str) -> Result<(), CacheError> {
        self.ensure_open()?;
        self.hashes
            .write()
            .await
            .entry(hash.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hget(&self, hash: &str, field: &str) -> Result<Option<String>, CacheError> {
        self.ensure_open()?;
        let hashes = self.hashes.read().await;
        Ok(hashes.get(hash).and_then(|fields| fields.get(field)).cloned())
    }

    async fn hexists(&self, hash: &str, field: &str) -> Result<bool, CacheError> {
        self.ensure_open()?;
        let hashes = self.hashes.read().await;
        Ok(hashes
            .get(hash)
            .is_some_and(|fields| fields.contains_key(field)))
    }

    async fn hdel(&self, hash: &str, field: &str) -> Result<bool, CacheError> {
        self.ensure_open()?;
        let mut hashes = self.hashes.write().await;
        let Some(fields) = hashes.get_mut(hash) else {
            return Ok(false);
        };
        let removed = fields.remove(field).is_some();
        // Redis drops a hash once its last field is gone
        if fields.is_empty() {
            hashes.remove(hash);
        }
        Ok(removed)
    }

    async fn ping(&self) -> Result<String, CacheError> {
        self.ensure_open()?;
        Ok("PONG".to_string())
    }

    async fn disconnect(&self) -> Result<bool, CacheError> {
        Ok(!self.closed.swap(true, Ordering::AcqRel))
    }
}
