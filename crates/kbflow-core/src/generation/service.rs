//! Generation service wrapper with observability.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::{GenerationProvider, GenerationRequest, GenerationResponse, Result, TRACING_TARGET};

/// Generation service wrapper with observability.
///
/// The inner provider is wrapped in `Arc` for cheap cloning, so one loaded
/// backend can serve every concurrent run.
#[derive(Clone)]
pub struct GenerationService {
    inner: Arc<dyn GenerationProvider>,
}

impl fmt::Debug for GenerationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationService").finish_non_exhaustive()
    }
}

impl GenerationService {
    /// Creates a new generation service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: GenerationProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Generates a continuation for the request prompt.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            prompt_len = request.prompt.len(),
            max_new_tokens = request.max_new_tokens,
            model = ?request.model,
            "Generating text"
        );

        let result = self.inner.generate(request).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(response) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    response_len = response.text.len(),
                    model = ?response.model,
                    elapsed_ms = elapsed.as_millis(),
                    "Generation completed"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Generation failed"
                );
            }
        }

        result
    }
}
