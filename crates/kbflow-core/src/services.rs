//! AI services container for dependency injection.
//!
//! This module provides the [`AiServices`] struct which holds the service
//! handles a workflow run needs, so hosts construct backends once and share
//! them across runs.

use crate::generation::GenerationService;
use crate::retrieval::RetrievalService;

/// Container for AI services.
#[derive(Debug, Clone)]
pub struct AiServices {
    /// Vector store used by retrieval nodes.
    pub retrieval: RetrievalService,
    /// Text generation backend used by generation nodes.
    pub generation: GenerationService,
}

impl AiServices {
    /// Creates a new AI services container.
    pub fn new(retrieval: RetrievalService, generation: GenerationService) -> Self {
        Self {
            retrieval,
            generation,
        }
    }
}
