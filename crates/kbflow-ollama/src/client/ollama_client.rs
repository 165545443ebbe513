//! Ollama client implementation using reqwest.

use std::sync::Arc;
use std::time::Instant;

use kbflow_core::embedding::{EmbeddingProvider, EmbeddingService};
use kbflow_core::generation::{
    GenerationProvider, GenerationRequest, GenerationResponse, GenerationService,
};
use reqwest::{Client, Response};

use super::OllamaConfig;
use super::api::{
    EmbedRequest, EmbedResponse, ErrorResponse, GenerateOptions, GenerateRequest,
    GenerateResponse, TagsResponse,
};
use crate::TRACING_TARGET_CLIENT;
use crate::error::{Error, Result};

/// Inner client that holds the HTTP client and configuration.
struct OllamaClientInner {
    http: Client,
    config: OllamaConfig,
}

impl std::fmt::Debug for OllamaClientInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClientInner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Ollama API client.
///
/// Implements [`GenerationProvider`] through `/api/generate` and
/// [`EmbeddingProvider`] through `/api/embed`. Cloning is cheap.
#[derive(Clone, Debug)]
pub struct OllamaClient {
    inner: Arc<OllamaClientInner>,
}

impl OllamaClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            base_url = %config.base_url,
            timeout_ms = config.timeout.as_millis() as u64,
            "Creating Ollama client"
        );

        config.base_url()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            model = %config.model,
            embedding_model = %config.embedding_model,
            "Ollama client created successfully"
        );

        Ok(Self {
            inner: Arc::new(OllamaClientInner { http, config }),
        })
    }

    /// Creates a new client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(OllamaConfig::default())
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &OllamaConfig {
        &self.inner.config
    }

    /// Converts this client into a [`GenerationService`].
    pub fn into_generation_service(self) -> GenerationService {
        GenerationService::new(self)
    }

    /// Converts this client into an [`EmbeddingService`].
    pub fn into_embedding_service(self) -> EmbeddingService {
        EmbeddingService::new(self)
    }

    /// Lists installed models, failing when the server is unreachable.
    pub async fn health_check(&self) -> Result<Vec<String>> {
        let url = self.inner.config.endpoint("api/tags")?;
        let response = self.inner.http.get(url).send().await?;
        let tags: TagsResponse = Self::parse(response).await?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            model_count = tags.models.len(),
            "Ollama health check succeeded"
        );

        Ok(tags.models.into_iter().map(|tag| tag.name).collect())
    }

    /// Generates a completion for the request.
    pub async fn generate_text(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let config = &self.inner.config;
        let body = GenerateRequest {
            model: request.model.as_deref().unwrap_or(&config.model),
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: request.max_new_tokens,
                temperature: request.temperature.unwrap_or(config.temperature),
            },
        };

        let started = Instant::now();
        let url = config.endpoint("api/generate")?;
        let response = self.inner.http.post(url).json(&body).send().await?;
        let reply: GenerateResponse = Self::parse(response).await?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            model = %reply.model,
            eval_count = reply.eval_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Ollama generation completed"
        );

        Ok(GenerationResponse::new(reply.text()).with_model(reply.model))
    }

    /// Embeds a batch of texts with the configured embedding model.
    pub async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let config = &self.inner.config;
        let body = EmbedRequest {
            model: &config.embedding_model,
            input: texts,
        };

        let url = config.endpoint("api/embed")?;
        let response = self.inner.http.post(url).json(&body).send().await?;
        let reply: EmbedResponse = Self::parse(response).await?;
        Ok(reply.embeddings)
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorResponse>(&body)
                .map(|error| error.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());

            tracing::warn!(
                target: TRACING_TARGET_CLIENT,
                status = status.as_u16(),
                error = %message,
                "Ollama request failed"
            );

            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait::async_trait]
impl GenerationProvider for OllamaClient {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> kbflow_core::Result<GenerationResponse> {
        Ok(self.generate_text(request).await?)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaClient {
    async fn embed(&self, texts: &[String]) -> kbflow_core::Result<Vec<Vec<f32>>> {
        Ok(self.embed_texts(texts).await?)
    }
}
