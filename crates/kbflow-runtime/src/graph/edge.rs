//! Edge declarations.

use serde::{Deserialize, Serialize};

use super::NodeId;

/// A dependency: `source` must execute before `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Upstream node.
    pub source: NodeId,
    /// Downstream node.
    pub target: NodeId,
}

impl Edge {
    /// Creates a new edge.
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}
