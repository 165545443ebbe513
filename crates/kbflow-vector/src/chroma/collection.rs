//! Chroma collections.

use kbflow_core::retrieval::{Collection, QueryRequest, QueryResponse, Record};
use serde_json::{Map, Value};

use super::api::{AddBody, QueryBody, QueryResult};
use super::store::ChromaStore;
use crate::TRACING_TARGET;
use crate::error::{VectorError, VectorResult};

/// A collection on a Chroma server.
#[derive(Debug, Clone)]
pub(crate) struct ChromaCollection {
    store: ChromaStore,
    id: String,
    name: String,
}

impl ChromaCollection {
    pub(crate) fn new(store: ChromaStore, id: String, name: impl Into<String>) -> Self {
        Self {
            store,
            id,
            name: name.into(),
        }
    }

    async fn query_documents(&self, request: &QueryRequest) -> VectorResult<QueryResponse> {
        let embedding = self
            .store
            .inner
            .embedding
            .embed_one(&request.text)
            .await
            .map_err(VectorError::Embedding)?;

        let body = QueryBody {
            query_embeddings: vec![embedding],
            n_results: request.top_k,
            include: request.include.iter().map(AsRef::<str>::as_ref).collect(),
        };

        let url = self
            .store
            .inner
            .config
            .collections_endpoint(&[self.id.as_str(), "query"])?;
        let result: QueryResult = self
            .store
            .send(self.store.inner.http.post(url).json(&body))
            .await?;

        into_response(result)
    }

    async fn add_records(&self, records: Vec<Record>) -> VectorResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let documents: Vec<String> = records.iter().map(|r| r.document.clone()).collect();
        let embeddings = self
            .store
            .inner
            .embedding
            .embed(&documents)
            .await
            .map_err(VectorError::Embedding)?;

        let (ids, metadatas): (Vec<String>, Vec<Option<Map<String, Value>>>) = records
            .into_iter()
            .map(|record| {
                let metadata = (!record.metadata.is_empty()).then_some(record.metadata);
                (record.id, metadata)
            })
            .unzip();

        let body = AddBody {
            ids,
            embeddings,
            documents,
            metadatas,
        };

        let url = self
            .store
            .inner
            .config
            .collections_endpoint(&[self.id.as_str(), "add"])?;
        let _: Value = self
            .store
            .send(self.store.inner.http.post(url).json(&body))
            .await?;

        tracing::debug!(
            target: TRACING_TARGET,
            collection = %self.name,
            count = body.ids.len(),
            "Added records to Chroma collection"
        );
        Ok(())
    }
}

/// Flattens the single-query reply into a response.
fn into_response(result: QueryResult) -> VectorResult<QueryResponse> {
    let ids = result.ids.into_iter().next().unwrap_or_default();
    let count = ids.len();

    let documents: Vec<String> = first_row(result.documents)
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect();
    if !documents.is_empty() && documents.len() != count {
        return Err(VectorError::invalid_response(format!(
            "expected {count} documents, got {}",
            documents.len()
        )));
    }

    let metadatas: Vec<Map<String, Value>> = first_row(result.metadatas)
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect();
    let distances = first_row(result.distances);

    Ok(QueryResponse {
        ids,
        documents,
        metadatas,
        distances,
    })
}

fn first_row<T>(rows: Option<Vec<Vec<T>>>) -> Vec<T> {
    rows.and_then(|rows| rows.into_iter().next())
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl Collection for ChromaCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, request: &QueryRequest) -> kbflow_core::Result<QueryResponse> {
        Ok(self.query_documents(request).await?)
    }

    async fn add(&self, records: Vec<Record>) -> kbflow_core::Result<()> {
        Ok(self.add_records(records).await?)
    }
}
