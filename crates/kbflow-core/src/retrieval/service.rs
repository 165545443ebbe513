//! Retrieval service wrapper with observability.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::{Collection, QueryRequest, QueryResponse, Record, Result, TRACING_TARGET, VectorStore};

/// Retrieval service wrapper with observability.
///
/// Wraps any [`VectorStore`] in an `Arc` for cheap cloning and adds
/// structured logging around collection lookups.
#[derive(Clone)]
pub struct RetrievalService {
    inner: Arc<dyn VectorStore>,
}

impl fmt::Debug for RetrievalService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrievalService").finish_non_exhaustive()
    }
}

impl RetrievalService {
    /// Creates a new retrieval service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: VectorStore + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Returns the named collection, creating it if needed.
    pub async fn collection(&self, name: &str) -> Result<CollectionHandle> {
        tracing::debug!(
            target: TRACING_TARGET,
            collection = %name,
            "Resolving collection"
        );

        match self.inner.get_or_create_collection(name).await {
            Ok(inner) => Ok(CollectionHandle { inner }),
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    collection = %name,
                    error = %error,
                    "Failed to resolve collection"
                );
                Err(error)
            }
        }
    }
}

/// A resolved collection with traced operations.
#[derive(Clone)]
pub struct CollectionHandle {
    inner: Arc<dyn Collection>,
}

impl fmt::Debug for CollectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionHandle")
            .field("name", &self.inner.name())
            .finish()
    }
}

impl CollectionHandle {
    /// Returns the collection name.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Queries the collection.
    pub async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            collection = %self.name(),
            top_k = request.top_k,
            simplified = request.is_simplified(),
            "Querying collection"
        );

        let result = self.inner.query(request).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(response) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    collection = %self.name(),
                    matches = response.len(),
                    elapsed_ms = elapsed.as_millis(),
                    "Collection query completed"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    collection = %self.name(),
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Collection query failed"
                );
            }
        }

        result
    }

    /// Adds records to the collection.
    pub async fn add(&self, records: Vec<Record>) -> Result<()> {
        let count = records.len();
        tracing::debug!(
            target: TRACING_TARGET,
            collection = %self.name(),
            count,
            "Adding records"
        );

        self.inner.add(records).await?;

        tracing::info!(
            target: TRACING_TARGET,
            collection = %self.name(),
            count,
            "Records added"
        );
        Ok(())
    }
}
