//! Wire types of the Ollama HTTP API.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    pub options: GenerateOptions,
}

/// Sampling options of a generate request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct GenerateOptions {
    pub num_predict: u32,
    pub temperature: f32,
}

/// Non-streaming reply of `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct GenerateResponse {
    pub model: String,
    pub response: String,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

/// Text returned in place of an empty completion.
pub(crate) const EMPTY_RESPONSE: &str = "No response generated";

impl GenerateResponse {
    /// Returns the completion, or [`EMPTY_RESPONSE`] when the model produced
    /// only whitespace.
    pub fn text(&self) -> &str {
        if self.response.trim().is_empty() {
            EMPTY_RESPONSE
        } else {
            &self.response
        }
    }
}

/// Body of `POST /api/embed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct EmbedRequest<'a> {
    pub model: &'a str,
    pub input: &'a [String],
}

/// Reply of `POST /api/embed`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct EmbedResponse {
    pub embeddings: Vec<Vec<f32>>,
}

/// Reply of `GET /api/tags`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

/// One installed model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ModelTag {
    pub name: String,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: String,
}
