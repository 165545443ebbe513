//! Ollama configuration.

use std::time::Duration;

use clap::Args;
use kbflow_ollama::OllamaConfig;
use serde::{Deserialize, Serialize};

/// Ollama configuration for generation and embeddings.
#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct OllamaArgs {
    /// Base URL of the Ollama server.
    #[arg(long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Generation model used by LLM engine nodes without a `model` setting.
    #[arg(long, env = "OLLAMA_MODEL", default_value = "llama3.2")]
    pub ollama_model: String,

    /// Embedding model used for retrieval and ingestion.
    #[arg(long, env = "OLLAMA_EMBEDDING_MODEL", default_value = "all-minilm")]
    pub ollama_embedding_model: String,

    /// Sampling temperature used when a node sets none.
    #[arg(long, env = "OLLAMA_TEMPERATURE", default_value_t = 0.7)]
    pub ollama_temperature: f32,

    /// Request timeout in seconds.
    #[arg(long = "ollama-timeout", env = "OLLAMA_TIMEOUT", default_value_t = 120)]
    pub ollama_timeout_secs: u64,
}

impl OllamaArgs {
    /// Builds the client configuration.
    pub fn to_config(&self) -> anyhow::Result<OllamaConfig> {
        let config = OllamaConfig::builder()
            .with_base_url(self.ollama_url.as_str())
            .with_model(self.ollama_model.as_str())
            .with_embedding_model(self.ollama_embedding_model.as_str())
            .with_temperature(self.ollama_temperature)
            .with_timeout(Duration::from_secs(self.ollama_timeout_secs))
            .build()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> OllamaArgs {
        OllamaArgs {
            ollama_url: "http://ollama:11434".into(),
            ollama_model: "mistral".into(),
            ollama_embedding_model: "nomic-embed-text".into(),
            ollama_temperature: 0.2,
            ollama_timeout_secs: 60,
        }
    }

    #[test]
    fn builds_client_config() {
        let config = args().to_config().unwrap();
        assert_eq!(config.base_url, "http://ollama:11434");
        assert_eq!(config.model, "mistral");
        assert_eq!(config.embedding_model, "nomic-embed-text");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn rejects_invalid_url() {
        let args = OllamaArgs {
            ollama_url: "not a url".into(),
            ..args()
        };
        assert!(args.to_config().is_err());
    }
}
