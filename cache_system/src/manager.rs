//! Cache manager implementation
//!
//! This module provides the Redis-backed [`HashStore`] and its
//! connection management.

use crate::errors::CacheError;
use crate::store::HashStore;
use async_trait::async_trait;
use config::CacheConfig;
use redis::{AsyncCommands, Client, RedisError};
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Redis-based cache manager
///
/// Clones share one multiplexed connection, which serializes command dispatch
/// and is safe to use from many in-flight operations at once.
#[derive(Clone)]
pub struct CacheManager {
    client: Arc<Client>,
    config: Arc<CacheConfig>,
    connection_pool: Arc<RwLock<Option<redis::aio::MultiplexedConnection>>>,
    closed: Arc<AtomicBool>,
}

impl Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let connection_status = if self.closed.load(Ordering::Acquire) {
            "closed"
        } else {
            match self.connection_pool.try_read() {
                Ok(pool) => {
                    if pool.is_some() {
                        "connected"
                    } else {
                        "no_connection"
                    }
                }
                Err(_) => "lock_error",
            }
        };

        f.debug_struct("CacheManager")
            .field("config", &self.config)
            .field("connected", &connection_status)
            .finish()
    }
}

impl CacheManager {
    /// Create a new cache manager. The connection is opened lazily on first use.
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        let client = Client::open(config.redis_url.as_str())?;

        Ok(Self {
            client: Arc::new(client),
            config: Arc::new(config),
            connection_pool: Arc::new(RwLock::new(None)),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get or create Redis connection
    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, CacheError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(CacheError::Disconnected);
        }

        let mut pool = self.connection_pool.write().await;
        // disconnect may have taken the connection while this call waited for the lock
        if self.closed.load(Ordering::Acquire) {
            return Err(CacheError::Disconnected);
        }

        if pool.is_none() {
            let connection = self
                .client
                .get_multiplexed_async_connection()
                .await
                .map_err(transport_error)?;
            crate::debug_log!("Opened Redis connection to {}", self.config.redis_url);
            *pool = Some(connection);
        }

        Ok(pool
            .as_ref()
            .ok_or_else(|| CacheError::Connection("Failed to get connection from pool".into()))?
            .clone())
    }

    /// Get current configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

/// Transport failures are logged here and still returned to the caller.
fn transport_error(e: RedisError) -> CacheError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout()
    {
        tracing::error!(error = %e, "Redis transport error");
    }
    CacheError::ConnectionError(e)
}

#[async_trait]
impl HashStore for CacheManager {
    async fn hset(&self, hash: &str, field: &str, value: &str) -> Result<(), CacheError> {
        let mut conn = self.get_connection().await?;

        let _: () = conn.hset(hash, field, value).await.map_err(transport_error)?;
        crate::trace_log!("HSET {} {} ({} bytes)", hash, field, value.len());
        Ok(())
    }

    async fn hget(&self, hash: &str, field: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.get_connection().await?;

        let value: Option<String> = conn.hget(hash, field).await.map_err(transport_error)?;
        crate::trace_log!("HGET {} {} hit={}", hash, field, value.is_some());
        Ok(value)
    }

    async fn hexists(&self, hash: &str, field: &str) -> Result<bool, CacheError> {
        let mut conn = self.get_connection().await?;

        let exists: bool = conn.hexists(hash, field).await.map_err(transport_error)?;
        Ok(exists)
    }

    async fn hdel(&self, hash: &str, field: &str) -> Result<bool, CacheError> {
        let mut conn = self.get_connection().await?;

        let deleted: i32 = conn.hdel(hash, field).await.map_err(transport_error)?;
        Ok(deleted > 0)
    }

    /// Ping Redis to check connectivity
    async fn ping(&self) -> Result<String, CacheError> {
        let mut conn = self.get_connection().await?;

        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(transport_error)?;
        Ok(pong)
    }

    async fn disconnect(&self) -> Result<bool, CacheError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(false);
        }

        // Dropping the last handle closes the multiplexed connection; in-flight
        // commands on clones may still finish or fail.
        let connection = self.connection_pool.write().await.take();
        tracing::info!(
            had_connection = connection.is_some(),
            "Disconnected from Redis at {}",
            self.config.redis_url
        );
        Ok(true)
    }
}
