//! Generation request type.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Default number of tokens a generation may produce.
pub const DEFAULT_MAX_NEW_TOKENS: u32 = 256;

/// A prompt to complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct GenerationRequest {
    /// Full prompt text.
    pub prompt: String,
    /// Upper bound on generated tokens.
    #[builder(default = "DEFAULT_MAX_NEW_TOKENS")]
    pub max_new_tokens: u32,
    /// Model override; the backend default is used when absent.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Sampling temperature override.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GenerationRequestBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_new_tokens == Some(0) {
            return Err("max_new_tokens must be at least 1".into());
        }
        if let Some(Some(temperature)) = self.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(format!("temperature {temperature} is outside 0.0..=2.0"));
        }
        Ok(())
    }
}

impl GenerationRequest {
    /// Creates a request with default limits.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            model: None,
            temperature: None,
        }
    }

    /// Returns a builder for creating a request.
    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder::default()
    }
}
