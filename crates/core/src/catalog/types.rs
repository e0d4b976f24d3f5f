//! Types for the stored catalog.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Movie,
    Series,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemType::Movie => f.write_str("movie"),
            ItemType::Series => f.write_str("series"),
        }
    }
}

/// The remote API's native identifier.
///
/// Opaque to us; the API hands out either strings or integers and both are
/// stored exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RealId(Value);

impl RealId {
    /// Accept a non-empty string or a number; anything else is not an id.
    pub fn from_value(value: Value) -> Option<Self> {
        match &value {
            Value::String(s) if !s.is_empty() => Some(Self(value)),
            Value::Number(_) => Some(Self(value)),
            _ => None,
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<&str> for RealId {
    fn from(s: &str) -> Self {
        Self(Value::String(s.to_string()))
    }
}

impl From<u64> for RealId {
    fn from(n: u64) -> Self {
        Self(Value::from(n))
    }
}

impl fmt::Display for RealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

/// A catalog record in its stored shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Canonical id, `"{namespace}_{real_id}"`.
    pub id: String,
    pub real_id: RealId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Release year, as sent by the API (string or number).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<Value>,
    /// Rating, as sent by the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "itemType")]
    pub item_type: ItemType,
    /// Opaque playback source descriptors.
    #[serde(default)]
    pub sources: Vec<Value>,
    /// Season listing; only ever set on series. Serialized as `null` when unset.
    #[serde(default)]
    pub seasons: Option<Value>,
}

impl CatalogItem {
    pub fn is_series(&self) -> bool {
        self.item_type == ItemType::Series
    }
}
