//! Text embedding contracts.

mod service;

pub use service::EmbeddingService;

pub use crate::{Error, ErrorKind, Result};

/// Tracing target for embedding operations.
pub const TRACING_TARGET: &str = "kbflow_core::embedding";

/// Core trait for embedding backends.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds each text into a vector.
    ///
    /// The returned vectors are in the same order as `texts`.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
