//! Mock implementations of the collaborator contracts for testing.
//!
//! [`MockProvider`] implements every contract in this crate with in-memory
//! state. It returns fixed documents for every query, generates text either
//! from a fixed response or by echoing the prompt, and records each call so
//! tests can assert on what the runtime asked for.
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! kbflow-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use kbflow_core::mock::{MockConfig, MockProvider};
//!
//! let provider = MockProvider::new(MockConfig {
//!     documents: vec!["X is a letter.".into()],
//!     ..MockConfig::default()
//! });
//! let services = provider.clone().into_services();
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::embedding::{EmbeddingProvider, EmbeddingService};
use crate::generation::{GenerationProvider, GenerationRequest, GenerationResponse, GenerationService};
use crate::retrieval::{Collection, QueryRequest, QueryResponse, Record, RetrievalService, VectorStore};
use crate::{AiServices, Error, Result};

/// How the mock generation backend produces text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockGeneration {
    /// Returns the prompt followed by a blank line and the given answer.
    Echo(String),
    /// Returns the given text unchanged.
    Fixed(String),
    /// Fails every call.
    Fail,
}

impl Default for MockGeneration {
    fn default() -> Self {
        Self::Fixed("mock response".into())
    }
}

/// Which retrieval query shapes fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MockRetrievalFailure {
    /// Every query succeeds.
    #[default]
    None,
    /// Full queries fail, simplified ones succeed.
    Primary,
    /// Every query fails.
    All,
    /// Collection lookup fails.
    Collection,
}

/// Configuration for the mock provider.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Documents returned by every query in every collection.
    pub documents: Vec<String>,
    /// Per-collection documents, taking precedence over `documents`.
    pub collections: HashMap<String, Vec<String>>,
    /// Generation behavior.
    pub generation: MockGeneration,
    /// Retrieval failure mode.
    pub retrieval_failure: MockRetrievalFailure,
    /// Dimensions of mock embedding vectors.
    pub embedding_dimensions: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            documents: Vec::new(),
            collections: HashMap::new(),
            generation: MockGeneration::default(),
            retrieval_failure: MockRetrievalFailure::default(),
            embedding_dimensions: 8,
        }
    }
}

/// A recorded retrieval query.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    /// Collection that was queried.
    pub collection: String,
    /// The query as received.
    pub request: QueryRequest,
}

#[derive(Debug, Default)]
struct MockState {
    collections_requested: Vec<String>,
    queries: Vec<RecordedQuery>,
    prompts: Vec<GenerationRequest>,
    added: HashMap<String, Vec<Record>>,
}

/// In-memory provider implementing every collaborator contract.
///
/// Clones share recorded state.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    config: Arc<MockConfig>,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Creates a new mock provider.
    pub fn new(config: MockConfig) -> Self {
        Self {
            config: Arc::new(config),
            state: Arc::default(),
        }
    }

    /// Creates a provider returning `documents` and echoing prompts before `answer`.
    pub fn echoing<I, S>(documents: I, answer: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(MockConfig {
            documents: documents.into_iter().map(Into::into).collect(),
            generation: MockGeneration::Echo(answer.into()),
            ..MockConfig::default()
        })
    }

    /// Wraps this provider into the services container used by the runtime.
    pub fn into_services(self) -> AiServices {
        AiServices::new(
            RetrievalService::new(self.clone()),
            GenerationService::new(self),
        )
    }

    /// Wraps this provider into an embedding service.
    pub fn into_embedding_service(self) -> EmbeddingService {
        EmbeddingService::new(self)
    }

    /// Names passed to `get_or_create_collection`, in call order.
    pub fn collections_requested(&self) -> Vec<String> {
        self.state().collections_requested.clone()
    }

    /// Queries received, in call order.
    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.state().queries.clone()
    }

    /// Generation requests received, in call order.
    pub fn prompts(&self) -> Vec<GenerationRequest> {
        self.state().prompts.clone()
    }

    /// Records added to the named collection.
    pub fn added(&self, collection: &str) -> Vec<Record> {
        self.state()
            .added
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn documents_for(&self, collection: &str) -> Vec<String> {
        let mut documents = self
            .config
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_else(|| self.config.documents.clone());
        if let Some(added) = self.state().added.get(collection) {
            documents.extend(added.iter().map(|record| record.document.clone()));
        }
        documents
    }
}

#[async_trait::async_trait]
impl VectorStore for MockProvider {
    async fn get_or_create_collection(&self, name: &str) -> Result<Arc<dyn Collection>> {
        self.state().collections_requested.push(name.to_owned());

        if self.config.retrieval_failure == MockRetrievalFailure::Collection {
            return Err(Error::service_unavailable().with_message("mock store unavailable"));
        }

        Ok(Arc::new(MockCollection {
            name: name.to_owned(),
            provider: self.clone(),
        }))
    }
}

struct MockCollection {
    name: String,
    provider: MockProvider,
}

#[async_trait::async_trait]
impl Collection for MockCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        self.provider.state().queries.push(RecordedQuery {
            collection: self.name.clone(),
            request: request.clone(),
        });

        let fails = match self.provider.config.retrieval_failure {
            MockRetrievalFailure::None | MockRetrievalFailure::Collection => false,
            MockRetrievalFailure::Primary => !request.is_simplified(),
            MockRetrievalFailure::All => true,
        };
        if fails {
            return Err(Error::external_error().with_message("mock query failed"));
        }

        let documents: Vec<String> = self
            .provider
            .documents_for(&self.name)
            .into_iter()
            .take(request.top_k)
            .collect();
        let count = documents.len();

        Ok(QueryResponse {
            ids: (0..count).map(|i| format!("{}_{i}", self.name)).collect(),
            documents,
            metadatas: vec![Default::default(); count],
            distances: (0..count).map(|i| i as f32 * 0.1).collect(),
        })
    }

    async fn add(&self, records: Vec<Record>) -> Result<()> {
        self.provider
            .state()
            .added
            .entry(self.name.clone())
            .or_default()
            .extend(records);
        Ok(())
    }
}

#[async_trait::async_trait]
impl GenerationProvider for MockProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        self.state().prompts.push(request.clone());

        let text = match &self.config.generation {
            MockGeneration::Echo(answer) => format!("{}\n\n{answer}", request.prompt),
            MockGeneration::Fixed(text) => text.clone(),
            MockGeneration::Fail => {
                return Err(Error::external_error().with_message("mock generation failed"));
            }
        };

        Ok(GenerationResponse::new(text).with_model(
            request.model.clone().unwrap_or_else(|| "mock".to_owned()),
        ))
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let dimensions = self.config.embedding_dimensions;
        Ok(texts
            .iter()
            .map(|text| {
                let seed = text.bytes().map(f32::from).sum::<f32>();
                (0..dimensions).map(|i| (seed + i as f32).sin()).collect()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn query_returns_configured_documents() {
        let provider = MockProvider::echoing(["a", "b", "c"], "answer");
        let collection = provider.get_or_create_collection("docs").await.unwrap();
        let response = collection.query(&QueryRequest::new("q", 2)).await.unwrap();

        assert_eq!(response.documents, vec!["a", "b"]);
        assert_eq!(response.distances.len(), 2);
        assert_eq!(provider.collections_requested(), vec!["docs"]);
        assert_eq!(provider.queries().len(), 1);
    }

    #[tokio::test]
    async fn primary_failure_spares_simplified_queries() {
        let provider = MockProvider::new(MockConfig {
            documents: vec!["doc".into()],
            retrieval_failure: MockRetrievalFailure::Primary,
            ..MockConfig::default()
        });
        let collection = provider.get_or_create_collection("docs").await.unwrap();

        assert!(collection.query(&QueryRequest::new("q", 5)).await.is_err());
        let response = collection
            .query(&QueryRequest::simplified("q", 5))
            .await
            .unwrap();
        assert_eq!(response.documents, vec!["doc"]);
    }

    #[tokio::test]
    async fn echo_generation_prefixes_prompt() {
        let provider = MockProvider::echoing(Vec::<String>::new(), "X is a letter.");
        let response = provider
            .generate(&GenerationRequest::new("prompt"))
            .await
            .unwrap();

        assert_eq!(response.text, "prompt\n\nX is a letter.");
        assert_eq!(response.strip_prompt("prompt"), "X is a letter.");
        assert_eq!(provider.prompts()[0].prompt, "prompt");
    }

    #[tokio::test]
    async fn added_records_become_queryable() {
        let provider = MockProvider::default();
        let collection = provider.get_or_create_collection("kb").await.unwrap();
        collection
            .add(vec![Record::new("kb_0", "fresh document")])
            .await
            .unwrap();

        let response = collection.query(&QueryRequest::new("q", 5)).await.unwrap();
        assert_eq!(response.documents, vec!["fresh document"]);
        assert_eq!(provider.added("kb").len(), 1);
    }

    #[tokio::test]
    async fn embeddings_are_deterministic() {
        let provider = MockProvider::default();
        let texts = vec!["hello".to_owned(), "world".to_owned()];
        let first = provider.embed(&texts).await.unwrap();
        let second = provider.embed(&texts).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].len(), 8);
    }
}
