//! Collaborator construction and pre-flight checks.

use anyhow::Context;
use kbflow_core::AiServices;
use kbflow_core::retrieval::RetrievalService;
use kbflow_ollama::OllamaClient;
use kbflow_vector::ChromaStore;

use super::{ChromaArgs, OllamaArgs};
use crate::TRACING_TARGET_STARTUP;

/// The backend clients a command talks to.
#[derive(Debug, Clone)]
pub struct Providers {
    ollama: OllamaClient,
    chroma: ChromaStore,
}

impl Providers {
    /// Creates the Ollama client and the Chroma store embedding through it.
    pub fn new(ollama: &OllamaArgs, chroma: &ChromaArgs) -> anyhow::Result<Self> {
        let client = OllamaClient::new(ollama.to_config()?)
            .context("failed to create Ollama client")?;
        let store = ChromaStore::new(chroma.to_config()?, client.clone().into_embedding_service())
            .context("failed to create Chroma store")?;

        tracing::info!(
            target: TRACING_TARGET_STARTUP,
            ollama_url = %ollama.ollama_url,
            chroma_url = %chroma.chroma_url,
            model = %ollama.ollama_model,
            embedding_model = %ollama.ollama_embedding_model,
            "Providers configured"
        );

        Ok(Self {
            ollama: client,
            chroma: store,
        })
    }

    /// Fails unless both servers answer their health endpoints.
    ///
    /// A missing model is only logged; Ollama reports it again on first use.
    pub async fn check(&self) -> anyhow::Result<()> {
        let models = self.ollama.health_check().await.with_context(|| {
            format!("Ollama at {} is not reachable", self.ollama.config().base_url)
        })?;

        let config = self.ollama.config();
        for model in [&config.model, &config.embedding_model] {
            if !has_model(&models, model) {
                tracing::warn!(
                    target: TRACING_TARGET_STARTUP,
                    model = %model,
                    installed = ?models,
                    "Model is not installed on the Ollama server"
                );
            }
        }

        self.chroma.heartbeat().await.with_context(|| {
            format!("Chroma at {} is not reachable", self.chroma.config().base_url)
        })?;

        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            model_count = models.len(),
            "Providers are reachable"
        );
        Ok(())
    }

    /// Returns the retrieval service used by ingestion.
    pub fn into_retrieval_service(self) -> RetrievalService {
        self.chroma.into_retrieval_service()
    }

    /// Returns the services a workflow run needs.
    pub fn into_ai_services(self) -> AiServices {
        AiServices::new(
            self.chroma.into_retrieval_service(),
            self.ollama.into_generation_service(),
        )
    }
}

/// Ollama lists models with a tag; an untagged name means `latest`.
fn has_model(installed: &[String], model: &str) -> bool {
    installed.iter().any(|name| {
        name == model || (!model.contains(':') && name.strip_suffix(":latest") == Some(model))
    })
}
