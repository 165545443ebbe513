//! Workflow error types.

use strum::IntoStaticStr;
use thiserror::Error;

use crate::graph::{NodeId, NodeKind};

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum WorkflowError {
    /// Workflow definition is invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Node configuration is invalid.
    #[error("invalid config for node {node_id}: {message}")]
    InvalidNodeConfig {
        /// ID of the node with invalid config.
        node_id: NodeId,
        /// Error message.
        message: String,
    },

    /// Both the full and the simplified retrieval query failed.
    #[error("retrieval failed for node {node_id} in collection {collection}")]
    Retrieval {
        /// ID of the retrieval node.
        node_id: NodeId,
        /// Collection that was queried.
        collection: String,
        /// Last collaborator error.
        #[source]
        source: kbflow_core::Error,
    },

    /// The generation backend failed.
    #[error("generation failed for node {node_id}")]
    Generation {
        /// ID of the generation node.
        node_id: NodeId,
        /// Collaborator error.
        #[source]
        source: kbflow_core::Error,
    },

    /// Workflow execution was cancelled.
    #[error("workflow execution cancelled")]
    Cancelled,

    /// Workflow execution timed out.
    #[error("workflow execution timed out")]
    Timeout,

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WorkflowError {
    /// Returns whether the error was raised before any node executed.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns the error variant name in snake case.
    pub fn kind_str(&self) -> &'static str {
        self.into()
    }
}

/// Structural problems found before execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No node of a required kind is present.
    #[error("workflow must include a {0} node")]
    MissingNodeKind(NodeKind),

    /// The dependency graph contains a cycle.
    #[error("workflow must be a directed acyclic graph")]
    CyclicGraph,

    /// Node ids or edge endpoints are inconsistent.
    #[error("malformed workflow graph: {0}")]
    MalformedGraph(#[from] MalformedGraph),
}

/// Inconsistent node ids or edge endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedGraph {
    /// The same node id is declared more than once.
    #[error("node id {0} is declared more than once")]
    DuplicateNodeId(NodeId),

    /// An edge references an undeclared node id.
    #[error("edge {from} -> {to} references unknown node {missing}")]
    UnknownEdgeEndpoint {
        /// Edge source.
        from: NodeId,
        /// Edge target.
        to: NodeId,
        /// The endpoint that is not declared.
        missing: NodeId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_kind_message_uses_wire_name() {
        let error = ValidationError::MissingNodeKind(NodeKind::UserQuery);
        assert_eq!(error.to_string(), "workflow must include a UserQuery node");
    }

    #[test]
    fn validation_is_transparent() {
        let error = WorkflowError::from(ValidationError::CyclicGraph);
        assert!(error.is_validation());
        assert_eq!(error.to_string(), "workflow must be a directed acyclic graph");
        assert_eq!(error.kind_str(), "validation");
    }

    #[test]
    fn retrieval_error_keeps_source() {
        let error = WorkflowError::Retrieval {
            node_id: NodeId::from("kb"),
            collection: "knowledge_base".into(),
            source: kbflow_core::Error::timeout(),
        };
        assert!(!error.is_validation());
        assert_eq!(error.kind_str(), "retrieval");
        assert!(std::error::Error::source(&error).is_some());
    }
}
