//! Query and insert request types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::AsRefStr;

/// Result fields a query may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Include {
    /// Stored document texts.
    Documents,
    /// Per-document metadata.
    Metadatas,
    /// Distance between the query and each match.
    Distances,
}

/// A text query against a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Query text.
    pub text: String,
    /// Maximum number of matches to return.
    pub top_k: usize,
    /// Result fields to populate.
    pub include: Vec<Include>,
}

impl QueryRequest {
    /// Creates a full query returning documents, metadata and distances.
    pub fn new(text: impl Into<String>, top_k: usize) -> Self {
        Self {
            text: text.into(),
            top_k,
            include: vec![Include::Documents, Include::Metadatas, Include::Distances],
        }
    }

    /// Creates the simplified query shape that only asks for documents.
    pub fn simplified(text: impl Into<String>, top_k: usize) -> Self {
        Self {
            text: text.into(),
            top_k,
            include: vec![Include::Documents],
        }
    }

    /// Returns whether the given field was requested.
    pub fn includes(&self, field: Include) -> bool {
        self.include.contains(&field)
    }

    /// Returns whether this is the documents-only shape.
    pub fn is_simplified(&self) -> bool {
        self.include == [Include::Documents]
    }
}

/// A document to insert into a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique record identifier.
    pub id: String,
    /// Document text.
    pub document: String,
    /// Arbitrary metadata stored next to the document.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Record {
    /// Creates a record without metadata.
    pub fn new(id: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            document: document.into(),
            metadata: Map::new(),
        }
    }

    /// Adds a single metadata field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
