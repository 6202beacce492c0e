//! Cache event types and definitions
//!
//! This module defines the structure of change events
//! that flow through the signal system.

use serde::{Deserialize, Serialize};

/// Cache event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Insert,
    Update,
    Append,
    Delete,
    CatalogInsert,
    CatalogUpdate,
    CatalogDelete,
}

impl EventType {
    /// Whether the event changed the feature record (as opposed to metadata only)
    pub fn touches_features(&self) -> bool {
        matches!(
            self,
            EventType::Insert | EventType::Update | EventType::Append | EventType::Delete
        )
    }
}

/// Cache change event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEvent {
    /// Event type
    pub event_type: EventType,
    /// Resource key the operation targeted
    pub key: String,
    /// Number of features in the record after the operation, when known
    pub feature_count: Option<usize>,
    /// Event timestamp (UTC)
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl CacheEvent {
    pub fn new(event_type: EventType, key: impl Into<String>) -> Self {
        Self {
            event_type,
            key: key.into(),
            feature_count: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_feature_count(mut self, feature_count: usize) -> Self {
        self.feature_count = Some(feature_count);
        self
    }
}
