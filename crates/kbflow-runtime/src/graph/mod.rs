//! Workflow definitions and their validated graph form.
//!
//! A [`WorkflowDefinition`] is the serializable description of a pipeline.
//! [`WorkflowGraph::validated`] turns it into a petgraph-backed graph that
//! is known to be well formed and acyclic, and computes the execution order.

mod definition;
mod edge;
#[allow(clippy::module_inception)]
mod graph;
mod node;

pub use definition::{WorkflowDefinition, WorkflowMetadata};
pub use edge::Edge;
pub use graph::WorkflowGraph;
pub use node::{Node, NodeId, NodeKind};

/// Tracing target for graph operations.
pub const TRACING_TARGET: &str = "kbflow_runtime::graph";
