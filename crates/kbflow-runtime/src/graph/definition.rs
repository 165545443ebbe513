//! Serializable workflow definitions.

use serde::{Deserialize, Serialize};

use super::{Edge, Node, NodeId, WorkflowGraph};
use crate::error::WorkflowResult;

/// Optional descriptive metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A workflow as authored: nodes in declaration order plus edges.
///
/// ```json
/// {
///   "nodes": [
///     {"id": "1", "type": "UserQuery"},
///     {"id": "2", "type": "Output"}
///   ],
///   "edges": [{"source": "1", "target": "2"}]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Nodes in declaration order.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Dependencies between nodes.
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Descriptive metadata.
    #[serde(default, skip_serializing_if = "is_default")]
    pub metadata: WorkflowMetadata,
}

impl WorkflowDefinition {
    /// Creates an empty definition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a definition from JSON.
    pub fn from_json(json: &str) -> WorkflowResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the definition to pretty-printed JSON.
    pub fn to_json(&self) -> WorkflowResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Appends a node.
    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Appends an edge.
    pub fn with_edge(mut self, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        self.edges.push(Edge::new(source, target));
        self
    }

    /// Sets the metadata.
    pub fn with_metadata(mut self, metadata: WorkflowMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the first node declared with the given id.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    /// Checks the definition without executing anything.
    pub fn validate(&self) -> WorkflowResult<()> {
        WorkflowGraph::validated(self).map(drop)
    }

    /// Validates the definition and returns its execution order.
    pub fn execution_order(&self) -> WorkflowResult<Vec<NodeId>> {
        WorkflowGraph::validated(self)?.topological_order()
    }
}

fn is_default(metadata: &WorkflowMetadata) -> bool {
    metadata == &WorkflowMetadata::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;

    #[test]
    fn parses_frontend_payload() {
        let json = r#"{
            "nodes": [
                {"id": "1", "type": "UserQuery", "config": {}},
                {"id": "2", "type": "KnowledgeBase", "config": {"collectionName": "docs", "k": 3}},
                {"id": "3", "type": "LLMEngine", "config": {"maxTokens": 128, "temperature": 0.2}},
                {"id": "4", "type": "Output", "config": null}
            ],
            "edges": [
                {"source": "1", "target": "2"},
                {"source": "2", "target": "3"},
                {"source": "3", "target": "4"}
            ]
        }"#;

        let definition = WorkflowDefinition::from_json(json).unwrap();
        assert_eq!(definition.nodes.len(), 4);
        assert_eq!(definition.edges.len(), 3);
        assert_eq!(definition.nodes[2].kind, NodeKind::LlmEngine);
        assert_eq!(definition.metadata, WorkflowMetadata::default());
        assert!(definition.validate().is_ok());
    }

    #[test]
    fn invalid_json_is_serialization_error() {
        let error = WorkflowDefinition::from_json("{\"nodes\": 3}").unwrap_err();
        assert_eq!(error.kind_str(), "serialization");
    }

    #[test]
    fn execution_order_follows_edges() {
        let definition = WorkflowDefinition::new()
            .with_node(Node::output("out"))
            .with_node(Node::user_query("in"))
            .with_edge("in", "out");

        let order = definition.execution_order().unwrap();
        assert_eq!(order, vec![NodeId::from("in"), NodeId::from("out")]);
    }

    #[test]
    fn json_round_trip_preserves_definition() {
        let definition = WorkflowDefinition::new()
            .with_node(Node::user_query("1"))
            .with_node(Node::knowledge_base("2").with_config("k", 2))
            .with_node(Node::output("3"))
            .with_edge("1", "2")
            .with_edge("2", "3")
            .with_metadata(WorkflowMetadata {
                name: Some("faq".into()),
                description: None,
            });

        let json = definition.to_json().unwrap();
        assert_eq!(WorkflowDefinition::from_json(&json).unwrap(), definition);
    }
}
