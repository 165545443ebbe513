#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for the main library.
pub const TRACING_TARGET: &str = "kbflow_ollama";

/// Tracing target for client operations.
pub const TRACING_TARGET_CLIENT: &str = "kbflow_ollama::client";

mod client;
mod error;
#[doc(hidden)]
pub mod prelude;

pub use crate::client::{OllamaBuilder, OllamaBuilderError, OllamaClient, OllamaConfig};
pub use crate::error::{Error, Result};
