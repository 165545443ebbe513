//! Query response type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Matches returned by a collection query, closest first.
///
/// The vectors are parallel: `documents[i]`, `metadatas[i]` and `distances[i]`
/// describe the same match. Fields that were not requested may be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Identifiers of the matched records.
    #[serde(default)]
    pub ids: Vec<String>,
    /// Matched document texts.
    #[serde(default)]
    pub documents: Vec<String>,
    /// Metadata of the matched records.
    #[serde(default)]
    pub metadatas: Vec<Map<String, Value>>,
    /// Distances between the query and each match.
    #[serde(default)]
    pub distances: Vec<f32>,
}

impl QueryResponse {
    /// Creates an empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a response carrying only documents.
    pub fn from_documents<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            documents: documents.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Returns the number of matched documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns whether no documents matched.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Consumes the response and returns the document texts.
    pub fn into_documents(self) -> Vec<String> {
        self.documents
    }
}
