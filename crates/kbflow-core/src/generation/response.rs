//! Generation response type.

use serde::{Deserialize, Serialize};

/// Text produced by a generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text, possibly starting with an echo of the prompt.
    pub text: String,
    /// Model that produced the text, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl GenerationResponse {
    /// Creates a response with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
        }
    }

    /// Sets the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Returns the text with a leading prompt echo removed.
    ///
    /// When the text starts with `prompt`, the prompt is cut off and the rest
    /// is trimmed. Otherwise the text is returned unchanged.
    pub fn strip_prompt(&self, prompt: &str) -> String {
        match self.text.strip_prefix(prompt) {
            Some(rest) if !prompt.is_empty() => rest.trim().to_owned(),
            _ => self.text.clone(),
        }
    }
}
