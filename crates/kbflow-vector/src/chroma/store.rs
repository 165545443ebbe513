//! Chroma store.

use std::collections::HashMap;
use std::sync::Arc;

use kbflow_core::embedding::EmbeddingService;
use kbflow_core::retrieval::{Collection, RetrievalService, VectorStore};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use super::ChromaConfig;
use super::api::{CollectionInfo, CreateCollection, error_message};
use super::collection::ChromaCollection;
use crate::TRACING_TARGET;
use crate::error::{VectorError, VectorResult};

pub(crate) struct ChromaStoreInner {
    pub(crate) http: Client,
    pub(crate) config: ChromaConfig,
    pub(crate) embedding: EmbeddingService,
    collection_ids: RwLock<HashMap<String, String>>,
}

impl std::fmt::Debug for ChromaStoreInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromaStoreInner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Vector store backed by a Chroma server.
///
/// Texts are embedded client-side through the injected [`EmbeddingService`].
/// Collection ids are cached per store after the first lookup.
#[derive(Clone, Debug)]
pub struct ChromaStore {
    pub(crate) inner: Arc<ChromaStoreInner>,
}

impl ChromaStore {
    /// Creates a new store client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: ChromaConfig, embedding: EmbeddingService) -> VectorResult<Self> {
        config.endpoint("")?;

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        tracing::info!(
            target: TRACING_TARGET,
            base_url = %config.base_url,
            "Chroma store created"
        );

        Ok(Self {
            inner: Arc::new(ChromaStoreInner {
                http,
                config,
                embedding,
                collection_ids: RwLock::new(HashMap::new()),
            }),
        })
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &ChromaConfig {
        &self.inner.config
    }

    /// Converts this store into a [`RetrievalService`].
    pub fn into_retrieval_service(self) -> RetrievalService {
        RetrievalService::new(self)
    }

    /// Checks that the server is reachable.
    pub async fn heartbeat(&self) -> VectorResult<()> {
        let url = self.inner.config.endpoint("api/v2/heartbeat")?;
        let _: serde_json::Value = self.send(self.inner.http.get(url)).await?;
        Ok(())
    }

    /// Returns the server-side id of a collection, creating it if missing.
    pub async fn collection_id(&self, name: &str) -> VectorResult<String> {
        if let Some(id) = self.inner.collection_ids.read().await.get(name) {
            return Ok(id.clone());
        }

        let url = self.inner.config.collections_endpoint(&[])?;
        let body = CreateCollection {
            name,
            get_or_create: true,
        };
        let info: CollectionInfo = self.send(self.inner.http.post(url).json(&body)).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            collection = %info.name,
            id = %info.id,
            "Resolved Chroma collection"
        );

        self.inner
            .collection_ids
            .write()
            .await
            .insert(name.to_owned(), info.id.clone());
        Ok(info.id)
    }

    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> VectorResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = error_message(&body);
            tracing::warn!(
                target: TRACING_TARGET,
                status = status.as_u16(),
                error = %message,
                "Chroma request failed"
            );
            return Err(VectorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait::async_trait]
impl VectorStore for ChromaStore {
    async fn get_or_create_collection(
        &self,
        name: &str,
    ) -> kbflow_core::Result<Arc<dyn Collection>> {
        let id = self.collection_id(name).await?;
        Ok(Arc::new(ChromaCollection::new(self.clone(), id, name)))
    }
}

#[cfg(test)]
mod tests {
    use kbflow_core::mock::MockProvider;

    use super::*;

    #[test]
    fn store_from_default_config() {
        let store = ChromaStore::new(
            ChromaConfig::default(),
            MockProvider::default().into_embedding_service(),
        )
        .unwrap();
        assert_eq!(store.config().base_url, "http://localhost:8000");
    }

    #[test]
    fn invalid_url_is_rejected() {
        let result = ChromaStore::new(
            ChromaConfig::new("::bad::"),
            MockProvider::default().into_embedding_service(),
        );
        assert!(matches!(result, Err(VectorError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn unreachable_server_is_transient() {
        let config = ChromaConfig::builder()
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(std::time::Duration::from_secs(1))
            .build()
            .unwrap();
        let store = ChromaStore::new(config, MockProvider::default().into_embedding_service())
            .unwrap()
            .into_retrieval_service();

        let error = store.collection("docs").await.unwrap_err();
        assert!(error.is_transient());
    }

    #[tokio::test]
    async fn heartbeat_fails_when_unreachable() {
        let config = ChromaConfig::builder()
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(std::time::Duration::from_secs(1))
            .build()
            .unwrap();
        let store =
            ChromaStore::new(config, MockProvider::default().into_embedding_service()).unwrap();

        let error = kbflow_core::Error::from(store.heartbeat().await.unwrap_err());
        assert!(error.is_transient());
    }
}
