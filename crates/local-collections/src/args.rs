//! The `load_collection` argument bag.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CollectionResult;

/// Arguments of a `load_collection` call.
///
/// Only `id` and `bands` are consulted by the local handlers; the filters are
/// carried through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoadCollectionArgs {
    /// Collection id, i.e. the descriptor `id` (product posix path).
    #[serde(alias = "collection_id")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bands: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial_extent: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_extent: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
}

impl LoadCollectionArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_bands<I, S>(mut self, bands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bands = Some(bands.into_iter().map(Into::into).collect());
        self
    }

    /// Parse the argument bag as sent by a process graph.
    pub fn from_json(value: Value) -> CollectionResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Requested bands; `None` when absent or empty.
    pub fn requested_bands(&self) -> Option<&[String]> {
        self.bands.as_deref().filter(|b| !b.is_empty())
    }
}
