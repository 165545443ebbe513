//! Text generation contracts.

mod request;
mod response;
mod service;

pub use request::{GenerationRequest, GenerationRequestBuilder};
pub use response::GenerationResponse;
pub use service::GenerationService;

pub use crate::{Error, ErrorKind, Result};

/// Tracing target for generation operations.
pub const TRACING_TARGET: &str = "kbflow_core::generation";

/// Core trait for text generation backends.
///
/// Implementations may echo the prompt at the start of their output; callers
/// that care strip it themselves.
#[async_trait::async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generates a continuation for the request prompt.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;
}
