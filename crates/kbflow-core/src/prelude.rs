//! Prelude module for convenient imports.
//!
//! ```rust
//! use kbflow_core::prelude::*;
//! ```

pub use crate::embedding::{EmbeddingProvider, EmbeddingService};
pub use crate::generation::{
    GenerationProvider, GenerationRequest, GenerationResponse, GenerationService,
};
pub use crate::retrieval::{
    Collection, Include, QueryRequest, QueryResponse, Record, RetrievalService, VectorStore,
};
pub use crate::{AiServices, Error, ErrorKind, Result};
