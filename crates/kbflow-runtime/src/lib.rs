#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod engine;
mod error;
pub mod graph;
pub mod node;

#[doc(hidden)]
pub mod prelude;

pub use error::{MalformedGraph, ValidationError, WorkflowError, WorkflowResult};

/// Tracing target for runtime operations.
pub const TRACING_TARGET: &str = "kbflow_runtime";
