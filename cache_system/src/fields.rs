//! JSON-typed field accessors
//!
//! Values are serialized to JSON text on write and parsed back on read.
//! These four calls are the only way the coordinator touches storage.

use crate::errors::CacheError;
use crate::store::HashStore;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Typed record access for any [`HashStore`].
///
/// `record` names the hash holding one kind of record (e.g. `features`),
/// `key` is the resource key used as the field inside it.
#[async_trait]
pub trait JsonFields: HashStore {
    /// Serialize `value` and store it
    async fn set_field<T>(&self, record: &str, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let json_str = serde_json::to_string(value)?;
        self.hset(record, key, &json_str).await
    }

    /// Read and parse a stored value. A missing field yields `Ok(None)`;
    /// stored text that is not valid JSON for `T` is a `SerializationError`.
    async fn get_field<T>(&self, record: &str, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned + Send,
    {
        match self.hget(record, key).await? {
            Some(json_str) => {
                let value: T = serde_json::from_str(&json_str)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn field_exists(&self, record: &str, key: &str) -> Result<bool, CacheError> {
        self.hexists(record, key).await
    }

    async fn delete_field(&self, record: &str, key: &str) -> Result<bool, CacheError> {
        self.hdel(record, key).await
    }
}

impl<S: HashStore + ?Sized> JsonFields for S {}
