//! `KnowledgeBase` nodes.

use async_trait::async_trait;
use kbflow_core::AiServices;
use kbflow_core::retrieval::QueryRequest;

use super::{KnowledgeBaseConfig, NodeExecutor, NodeOutcome, TRACING_TARGET};
use crate::engine::{ContextPatch, NodeOutput, RunContext};
use crate::error::{WorkflowError, WorkflowResult};
use crate::graph::Node;

/// Retrieves the documents closest to the query.
///
/// A failed query is retried once in the simplified shape (documents only)
/// before the node fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnowledgeBaseNode;

#[async_trait]
impl NodeExecutor for KnowledgeBaseNode {
    async fn execute(
        &self,
        node: &Node,
        context: &RunContext,
        services: &AiServices,
    ) -> WorkflowResult<NodeOutcome> {
        let config = KnowledgeBaseConfig::from_node(node)?;
        let collection_name = config.collection_name();
        let top_k = config.top_k();

        let retrieval_error = |source| WorkflowError::Retrieval {
            node_id: node.id.clone(),
            collection: collection_name.to_owned(),
            source,
        };

        let collection = services
            .retrieval
            .collection(collection_name)
            .await
            .map_err(retrieval_error)?;

        let request = QueryRequest::new(context.query(), top_k);
        let response = match collection.query(&request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    node_id = %node.id,
                    collection = collection_name,
                    error = %error,
                    "Retrieval failed, retrying with documents only"
                );
                let request = QueryRequest::simplified(context.query(), top_k);
                collection.query(&request).await.map_err(retrieval_error)?
            }
        };

        let documents = response.into_documents();
        tracing::debug!(
            target: TRACING_TARGET,
            node_id = %node.id,
            collection = collection_name,
            document_count = documents.len(),
            "Retrieved documents"
        );

        let output = NodeOutput::new().with(NodeOutput::KB_DOCS, documents.clone());
        Ok(NodeOutcome::with_patch(output, ContextPatch::kb_docs(documents)))
    }
}

#[cfg(test)]
mod tests {
    use kbflow_core::mock::{MockConfig, MockProvider, MockRetrievalFailure};
    use kbflow_core::retrieval::Include;
    use serde_json::json;

    use super::*;

    fn provider(failure: MockRetrievalFailure) -> MockProvider {
        MockProvider::new(MockConfig {
            documents: vec!["one".into(), "two".into(), "three".into()],
            retrieval_failure: failure,
            ..MockConfig::default()
        })
    }

    #[tokio::test]
    async fn retrieves_top_k_documents() {
        let mock = provider(MockRetrievalFailure::None);
        let services = mock.clone().into_services();
        let node = Node::knowledge_base("kb")
            .with_config("collectionName", "faq")
            .with_config("k", 2);

        let outcome = KnowledgeBaseNode
            .execute(&node, &RunContext::new("q"), &services)
            .await
            .unwrap();

        assert_eq!(
            outcome.output.get(NodeOutput::KB_DOCS),
            Some(&json!(["one", "two"]))
        );
        assert_eq!(
            outcome.patch,
            ContextPatch::kb_docs(vec!["one".into(), "two".into()])
        );

        let queries = mock.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].collection, "faq");
        assert_eq!(queries[0].request.text, "q");
        assert_eq!(queries[0].request.top_k, 2);
        assert!(queries[0].request.includes(Include::Distances));
    }

    #[tokio::test]
    async fn short_collection_name_uses_default() {
        let mock = provider(MockRetrievalFailure::None);
        let services = mock.clone().into_services();
        let node = Node::knowledge_base("kb").with_config("collectionName", "ab");

        KnowledgeBaseNode
            .execute(&node, &RunContext::new("q"), &services)
            .await
            .unwrap();

        assert_eq!(
            mock.collections_requested(),
            vec!["knowledge_base".to_owned()]
        );
    }

    #[tokio::test]
    async fn falls_back_to_simplified_query() {
        let mock = provider(MockRetrievalFailure::Primary);
        let services = mock.clone().into_services();

        let outcome = KnowledgeBaseNode
            .execute(&Node::knowledge_base("kb"), &RunContext::new("q"), &services)
            .await
            .unwrap();

        assert_eq!(
            outcome.patch.kb_docs,
            Some(vec!["one".into(), "two".into(), "three".into()])
        );
        let queries = mock.queries();
        assert_eq!(queries.len(), 2);
        assert!(!queries[0].request.is_simplified());
        assert!(queries[1].request.is_simplified());
        assert_eq!(queries[1].request.top_k, 5);
    }

    #[tokio::test]
    async fn both_queries_failing_is_retrieval_error() {
        let mock = provider(MockRetrievalFailure::All);
        let services = mock.clone().into_services();

        let error = KnowledgeBaseNode
            .execute(&Node::knowledge_base("kb"), &RunContext::new("q"), &services)
            .await
            .unwrap_err();

        match error {
            WorkflowError::Retrieval {
                node_id,
                collection,
                ..
            } => {
                assert_eq!(node_id.as_str(), "kb");
                assert_eq!(collection, "knowledge_base");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(mock.queries().len(), 2);
    }

    #[tokio::test]
    async fn collection_failure_is_not_retried() {
        let mock = provider(MockRetrievalFailure::Collection);
        let services = mock.clone().into_services();

        let error = KnowledgeBaseNode
            .execute(&Node::knowledge_base("kb"), &RunContext::new("q"), &services)
            .await
            .unwrap_err();

        assert_eq!(error.kind_str(), "retrieval");
        assert!(mock.queries().is_empty());
    }

    #[tokio::test]
    async fn empty_collection_patches_empty_documents() {
        let services = MockProvider::default().into_services();

        let outcome = KnowledgeBaseNode
            .execute(&Node::knowledge_base("kb"), &RunContext::new("q"), &services)
            .await
            .unwrap();

        assert_eq!(outcome.patch.kb_docs, Some(Vec::new()));
    }
}
