//! GeoJSON payloads accepted and returned by the cache

use crate::metadata::Metadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single GeoJSON feature, kept as an opaque document
pub type Feature = Value;

pub const FEATURE_COLLECTION: &str = "FeatureCollection";

/// Input to insert/update/upsert/append.
///
/// Deserializes from either a bare array of features or an object carrying
/// `features` and an optional `metadata` member. Other members (e.g. `type`)
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "GeoJsonRepr")]
pub struct GeoJson {
    pub features: Vec<Feature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GeoJsonRepr {
    Collection {
        features: Vec<Feature>,
        #[serde(default)]
        metadata: Option<Metadata>,
    },
    Features(Vec<Feature>),
}

impl From<GeoJsonRepr> for GeoJson {
    fn from(repr: GeoJsonRepr) -> Self {
        match repr {
            GeoJsonRepr::Collection { features, metadata } => Self { features, metadata },
            GeoJsonRepr::Features(features) => Self {
                features,
                metadata: None,
            },
        }
    }
}

impl GeoJson {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            features,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl From<Vec<Feature>> for GeoJson {
    fn from(features: Vec<Feature>) -> Self {
        Self::new(features)
    }
}

impl TryFrom<Value> for GeoJson {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

/// Result of a retrieve: the stored features with their catalog metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub metadata: Metadata,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(metadata: Metadata, features: Vec<Feature>) -> Self {
        Self {
            kind: FEATURE_COLLECTION.to_string(),
            metadata,
            features,
        }
    }
}
