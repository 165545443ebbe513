//! Wire types of the Chroma v1 HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST .../collections`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CreateCollection<'a> {
    pub name: &'a str,
    pub get_or_create: bool,
}

/// A collection as returned by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct CollectionInfo {
    pub id: String,
    pub name: String,
}

/// Body of `POST .../collections/{id}/query`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct QueryBody<'a> {
    pub query_embeddings: Vec<Vec<f32>>,
    pub n_results: usize,
    pub include: Vec<&'a str>,
}

/// Reply of a query; one inner list per query embedding.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct QueryResult {
    #[serde(default)]
    pub ids: Vec<Vec<String>>,
    #[serde(default)]
    pub documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    pub metadatas: Option<Vec<Vec<Option<Map<String, Value>>>>>,
    #[serde(default)]
    pub distances: Option<Vec<Vec<f32>>>,
}

/// Body of `POST .../collections/{id}/add`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct AddBody {
    pub ids: Vec<String>,
    pub embeddings: Vec<Vec<f32>>,
    pub documents: Vec<String>,
    pub metadatas: Vec<Option<Map<String, Value>>>,
}

/// Picks the most useful message out of an error body.
pub(crate) fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error", "detail"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_owned))
        })
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned())
}
