//! Per-operation options

use serde::{Deserialize, Serialize};

/// Options for insert, update and upsert.
///
/// `ttl` is in seconds; 0 or a negative value means no expiration. Unknown
/// keys are ignored when deserializing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    pub ttl: i64,
}

impl CacheOptions {
    pub fn with_ttl(ttl: i64) -> Self {
        Self { ttl }
    }

    /// Expiration timestamp (ms) for a write made at `now`, if a TTL is set
    pub fn expires_at(&self, now: i64) -> Option<i64> {
        if self.ttl <= 0 {
            return None;
        }
        Some(now.saturating_add(self.ttl.saturating_mul(1000)))
    }
}
