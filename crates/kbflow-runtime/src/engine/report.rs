//! Run reports.

use jiff::Timestamp;
use serde::Serialize;
use uuid::Uuid;

use super::{ContextConflict, NodeOutput, RunContext};
use crate::graph::{NodeId, NodeKind};

/// The output one node produced during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Node that produced the output.
    pub node_id: NodeId,
    /// Kind of that node.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// The produced output.
    pub output: NodeOutput,
}

/// Everything a successful run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// Final answer.
    pub answer: String,
    /// Execution order.
    pub order: Vec<NodeId>,
    /// Node outputs in execution order.
    pub outputs: Vec<NodeRecord>,
    /// Context after the last node.
    pub context: RunContext,
    /// Overwrites between parallel branches.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<ContextConflict>,
    /// When execution started.
    pub started_at: Timestamp,
    /// When execution finished.
    pub finished_at: Timestamp,
}

impl RunReport {
    /// Returns the output recorded for a node.
    pub fn output(&self, node_id: &NodeId) -> Option<&NodeOutput> {
        self.outputs
            .iter()
            .find(|record| &record.node_id == node_id)
            .map(|record| &record.output)
    }

    /// Returns the wall-clock duration of the run.
    pub fn duration(&self) -> jiff::SignedDuration {
        self.finished_at.duration_since(self.started_at)
    }
}
