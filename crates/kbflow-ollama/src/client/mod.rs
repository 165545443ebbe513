//! Ollama HTTP client.

mod api;
mod ollama_client;
mod ollama_config;

pub use ollama_client::OllamaClient;
pub use ollama_config::{OllamaBuilder, OllamaBuilderError, OllamaConfig};
