#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for vector store operations.
pub const TRACING_TARGET: &str = "kbflow_vector";

mod chroma;
mod error;

pub use crate::chroma::{ChromaConfig, ChromaConfigBuilder, ChromaConfigBuilderError, ChromaStore};
pub use crate::error::{VectorError, VectorResult};
