//! Vector store retrieval contracts.
//!
//! A [`VectorStore`] hands out named [`Collection`]s. Collections answer text
//! queries with the closest stored documents and accept new records through
//! [`Collection::add`]. How documents are embedded and indexed is up to the
//! implementation.

mod request;
mod response;
mod service;

use std::sync::Arc;

pub use request::{Include, QueryRequest, Record};
pub use response::QueryResponse;
pub use service::{CollectionHandle, RetrievalService};

pub use crate::{Error, ErrorKind, Result};

/// Tracing target for retrieval operations.
pub const TRACING_TARGET: &str = "kbflow_core::retrieval";

/// A store of named document collections.
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    /// Returns the collection with the given name, creating it if missing.
    async fn get_or_create_collection(&self, name: &str) -> Result<Arc<dyn Collection>>;
}

/// A named collection of embedded documents.
#[async_trait::async_trait]
pub trait Collection: Send + Sync {
    /// Returns the collection name.
    fn name(&self) -> &str;

    /// Returns up to `request.top_k` documents closest to `request.text`.
    ///
    /// Only the fields listed in `request.include` are required to be
    /// populated in the response.
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse>;

    /// Adds records to the collection.
    async fn add(&self, records: Vec<Record>) -> Result<()>;
}
