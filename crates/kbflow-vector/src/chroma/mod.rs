//! Chroma HTTP backend.

mod api;
mod collection;
mod config;
mod store;

pub use config::{ChromaConfig, ChromaConfigBuilder, ChromaConfigBuilderError};
pub use store::ChromaStore;
