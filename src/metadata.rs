//! Catalog metadata record
//!
//! A metadata record is an open JSON object. The fields GeoHaus itself reads
//! or writes have typed accessors; anything else the caller supplies is kept
//! as-is and merged on catalog updates.

use crate::merge::merge_objects;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const NAME: &str = "name";
pub const DESCRIPTION: &str = "description";
pub const STATUS: &str = "status";
pub const UPDATED: &str = "updated";
pub const EXPIRES: &str = "expires";
pub const GEOMETRY_TYPE: &str = "geomtype";
pub const HOST: &str = "host";
pub const RETRIEVED_AT: &str = "retrieved_at";

/// Reserved status written by a soft delete
pub const STATUS_DELETED: &str = "deleted";

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set an arbitrary field, returning the previous value
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    fn millis_field(&self, field: &str) -> Option<i64> {
        self.0.get(field).and_then(Value::as_i64)
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field(NAME)
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field(DESCRIPTION)
    }

    pub fn status(&self) -> Option<&str> {
        self.str_field(STATUS)
    }

    pub fn geometry_type(&self) -> Option<&str> {
        self.str_field(GEOMETRY_TYPE)
    }

    pub fn host(&self) -> Option<&str> {
        self.str_field(HOST)
    }

    /// Last mutation time (ms since epoch)
    pub fn updated(&self) -> Option<i64> {
        self.millis_field(UPDATED)
    }

    /// Advisory expiration time (ms since epoch); never enforced by the cache
    pub fn expires(&self) -> Option<i64> {
        self.millis_field(EXPIRES)
    }

    pub fn retrieved_at(&self) -> Option<i64> {
        self.millis_field(RETRIEVED_AT)
    }

    pub fn is_deleted(&self) -> bool {
        self.status() == Some(STATUS_DELETED)
    }

    pub fn set_status(&mut self, status: &str) {
        self.insert(STATUS, status);
    }

    pub fn set_updated(&mut self, millis: i64) {
        self.insert(UPDATED, millis);
    }

    pub fn set_expires(&mut self, millis: i64) {
        self.insert(EXPIRES, millis);
    }

    /// Deep-merge `update` into this record; values from `update` win at each leaf
    pub fn merge(&mut self, update: Metadata) {
        merge_objects(&mut self.0, update.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Metadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Metadata {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}
