//! Hash-field storage backend abstraction
//!
//! Every backend stores string values under a `(hash, field)` pair. The
//! coordinator only ever talks to storage through this trait, so swapping
//! Redis for another backend means implementing it once.

use crate::errors::CacheError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Backend with per-hash fields that can be read, written, tested and removed independently.
///
/// A missing field is `Ok(None)` / `Ok(false)`, never an error; errors are
/// reserved for backend failures.
#[async_trait]
pub trait HashStore: Send + Sync + Debug {
    /// Write `value` into `field` of `hash`, replacing any previous value
    async fn hset(&self, hash: &str, field: &str, value: &str) -> Result<(), CacheError>;

    /// Read `field` of `hash`
    async fn hget(&self, hash: &str, field: &str) -> Result<Option<String>, CacheError>;

    /// Check whether `field` of `hash` is present
    async fn hexists(&self, hash: &str, field: &str) -> Result<bool, CacheError>;

    /// Remove `field` of `hash`, returning whether it existed
    async fn hdel(&self, hash: &str, field: &str) -> Result<bool, CacheError>;

    /// Round-trip check against the backend
    async fn ping(&self) -> Result<String, CacheError>;

    /// Release the backend connection.
    ///
    /// Returns `true` the first time and `false` on every later call. After a
    /// disconnect every other operation fails with [`CacheError::Disconnected`].
    async fn disconnect(&self) -> Result<bool, CacheError>;
}
