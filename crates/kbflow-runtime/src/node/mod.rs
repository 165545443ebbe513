//! Node executors.
//!
//! Each recognized [`NodeKind`] maps to one [`NodeExecutor`]. Executors read
//! the current [`RunContext`] and return a [`NodeOutcome`]: the output
//! recorded under the node id plus a [`ContextPatch`] for later nodes.

mod config;
mod knowledge_base;
mod llm_engine;
mod output;
mod prompt;
mod user_query;

use async_trait::async_trait;
use kbflow_core::AiServices;

pub use config::{
    DEFAULT_COLLECTION_NAME, DEFAULT_SYSTEM_PROMPT, DEFAULT_TOP_K, KnowledgeBaseConfig,
    LlmEngineConfig,
};
pub use knowledge_base::KnowledgeBaseNode;
pub use llm_engine::LlmEngineNode;
pub use output::OutputNode;
pub use prompt::{NO_CONTEXT, PromptTemplate};
pub use user_query::UserQueryNode;

use crate::engine::{ContextPatch, NodeOutput, RunContext};
use crate::error::WorkflowResult;
use crate::graph::{Node, NodeKind};

/// Tracing target for node execution.
pub const TRACING_TARGET: &str = "kbflow_runtime::node";

/// What a node produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeOutcome {
    /// Output recorded under the node id.
    pub output: NodeOutput,
    /// Context fields to write.
    pub patch: ContextPatch,
}

impl NodeOutcome {
    /// Creates an outcome that leaves the context unchanged.
    pub fn output(output: NodeOutput) -> Self {
        Self {
            output,
            patch: ContextPatch::empty(),
        }
    }

    /// Creates an outcome with a context patch.
    pub fn with_patch(output: NodeOutput, patch: ContextPatch) -> Self {
        Self { output, patch }
    }
}

/// Runs one kind of node.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    /// Executes `node` against the current context.
    async fn execute(
        &self,
        node: &Node,
        context: &RunContext,
        services: &AiServices,
    ) -> WorkflowResult<NodeOutcome>;
}

/// Executor for unrecognized node kinds: empty output, no patch.
#[derive(Debug, Clone, Copy, Default)]
pub struct InertNode;

#[async_trait]
impl NodeExecutor for InertNode {
    async fn execute(
        &self,
        node: &Node,
        _context: &RunContext,
        _services: &AiServices,
    ) -> WorkflowResult<NodeOutcome> {
        tracing::debug!(
            target: TRACING_TARGET,
            node_id = %node.id,
            kind = %node.kind,
            "Skipping node of unrecognized kind"
        );
        Ok(NodeOutcome::default())
    }
}

/// Returns the executor for a node kind.
pub fn executor_for(kind: &NodeKind) -> &'static dyn NodeExecutor {
    match kind {
        NodeKind::UserQuery => &UserQueryNode,
        NodeKind::KnowledgeBase => &KnowledgeBaseNode,
        NodeKind::LlmEngine => &LlmEngineNode,
        NodeKind::Output => &OutputNode,
        NodeKind::Unknown(_) => &InertNode,
    }
}

/// Executes a single node and returns its output with the next context.
pub async fn execute_node(
    node: &Node,
    context: &RunContext,
    services: &AiServices,
) -> WorkflowResult<(NodeOutput, RunContext)> {
    let outcome = executor_for(&node.kind)
        .execute(node, context, services)
        .await?;
    let next = context.merge(&node.id, outcome.patch);
    Ok((outcome.output, next))
}
