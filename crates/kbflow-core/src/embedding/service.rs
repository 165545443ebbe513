//! Embedding service wrapper with observability.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::{EmbeddingProvider, Error, Result, TRACING_TARGET};

/// Embedding service wrapper with observability.
#[derive(Clone)]
pub struct EmbeddingService {
    inner: Arc<dyn EmbeddingProvider>,
}

impl fmt::Debug for EmbeddingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingService").finish_non_exhaustive()
    }
}

impl EmbeddingService {
    /// Creates a new embedding service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: EmbeddingProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Embeds the given texts, skipping blank ones.
    ///
    /// Blank strings never reach the backend; an input made only of blank
    /// strings yields an empty result.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let texts: Vec<String> = texts
            .iter()
            .filter(|text| !text.trim().is_empty())
            .cloned()
            .collect();

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let started_at = Instant::now();
        let result = self.inner.embed(&texts).await;
        let elapsed = started_at.elapsed();

        match result {
            Ok(vectors) if vectors.len() != texts.len() => {
                tracing::error!(
                    target: TRACING_TARGET,
                    expected = texts.len(),
                    actual = vectors.len(),
                    "Embedding count mismatch"
                );
                Err(Error::external_error().with_message(format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    vectors.len()
                )))
            }
            Ok(vectors) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    count = vectors.len(),
                    dimensions = vectors.first().map(Vec::len).unwrap_or_default(),
                    elapsed_ms = elapsed.as_millis(),
                    "Embeddings generated"
                );
                Ok(vectors)
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Embedding failed"
                );
                Err(error)
            }
        }
    }

    /// Embeds a single text.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_owned()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::invalid_input().with_message("cannot embed blank text"))
    }
}
