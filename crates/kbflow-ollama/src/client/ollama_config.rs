//! Ollama client configuration
//!
//! This module provides configuration structures and builders for the Ollama client.

use std::time::Duration;

use derive_builder::Builder;
use url::Url;

use crate::error::{Error, Result};

/// Default Ollama server address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Configuration for the Ollama client
///
/// Contains the server address, timeouts and the models used when a
/// request does not name one.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    name = "OllamaBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate_config")
)]
pub struct OllamaConfig {
    /// Base URL for the Ollama API
    #[builder(default = "DEFAULT_BASE_URL.to_owned()")]
    pub base_url: String,
    /// Request timeout duration
    #[builder(default = "Duration::from_secs(120)")]
    pub timeout: Duration,
    /// Connection timeout duration
    #[builder(default = "Duration::from_secs(10)")]
    pub connect_timeout: Duration,
    /// Generation model used when a request names none
    #[builder(default = "DEFAULT_MODEL.to_owned()")]
    pub model: String,
    /// Embedding model
    #[builder(default = "DEFAULT_EMBEDDING_MODEL.to_owned()")]
    pub embedding_model: String,
    /// Temperature used when a request sets none
    #[builder(default = "DEFAULT_TEMPERATURE")]
    pub temperature: f32,
    /// User agent string for requests
    #[builder(default = "OllamaConfig::default_user_agent()")]
    pub user_agent: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
            model: DEFAULT_MODEL.to_owned(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            user_agent: Self::default_user_agent(),
        }
    }
}

impl OllamaConfig {
    /// Create a new configuration builder
    pub fn builder() -> OllamaBuilder {
        OllamaBuilder::default()
    }

    fn default_user_agent() -> String {
        format!("kbflow-ollama/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Parses the base URL, normalized to end with a slash.
    pub fn base_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            Error::invalid_config(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Resolves an API path against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url()?
            .join(path)
            .map_err(|e| Error::invalid_config(format!("Invalid endpoint '{}': {}", path, e)))
    }
}

impl OllamaBuilder {
    fn validate_config(&self) -> std::result::Result<(), String> {
        if let Some(base_url) = &self.base_url
            && let Err(e) = Url::parse(base_url)
        {
            return Err(format!("Invalid base URL '{}': {}", base_url, e));
        }

        if let Some(timeout) = &self.timeout
            && timeout.is_zero()
        {
            return Err("Timeout must be greater than 0".to_string());
        }

        if let Some(connect_timeout) = &self.connect_timeout
            && connect_timeout.is_zero()
        {
            return Err("Connect timeout must be greater than 0".to_string());
        }

        if let Some(model) = &self.model
            && model.trim().is_empty()
        {
            return Err("Model name must not be empty".to_string());
        }

        if let Some(model) = &self.embedding_model
            && model.trim().is_empty()
        {
            return Err("Embedding model name must not be empty".to_string());
        }

        if let Some(temperature) = self.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(format!("Temperature {temperature} is outside 0.0..=2.0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = OllamaConfig::builder()
            .with_timeout(Duration::from_secs(30))
            .with_model("mistral")
            .with_temperature(0.2f32)
            .build()
            .expect("Valid config");

        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.model, "mistral");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.embedding_model, "all-minilm");
    }

    #[test]
    fn test_default_config() {
        let config = OllamaConfig::default();

        assert_eq!(config.base_url().unwrap().as_str(), "http://localhost:11434/");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("kbflow-ollama/"));
        assert_eq!(OllamaConfig::builder().build().unwrap(), config);
    }

    #[test]
    fn test_custom_base_url() {
        let config = OllamaConfig::builder()
            .with_base_url("http://remote-ollama:11434")
            .build()
            .expect("Valid config");

        assert_eq!(config.base_url, "http://remote-ollama:11434");
        assert_eq!(
            config.endpoint("api/generate").unwrap().as_str(),
            "http://remote-ollama:11434/api/generate"
        );
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let config = OllamaConfig::builder()
            .with_base_url("http://gateway/ollama")
            .build()
            .expect("Valid config");

        assert_eq!(
            config.endpoint("api/tags").unwrap().as_str(),
            "http://gateway/ollama/api/tags"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = OllamaConfig::builder()
            .with_base_url("not-a-valid-url")
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let result = OllamaConfig::builder()
            .with_timeout(Duration::from_secs(0))
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_validation_empty_model() {
        let result = OllamaConfig::builder().with_model(" ").build();

        assert!(result.is_err());
    }

    #[test]
    fn test_validation_temperature_range() {
        let result = OllamaConfig::builder().with_temperature(3.5f32).build();

        assert!(result.is_err());
    }
}
