//! `UserQuery` nodes.

use async_trait::async_trait;
use kbflow_core::AiServices;

use super::{NodeExecutor, NodeOutcome};
use crate::engine::{NodeOutput, RunContext};
use crate::error::WorkflowResult;
use crate::graph::Node;

/// Exposes the run's query as the node output.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserQueryNode;

#[async_trait]
impl NodeExecutor for UserQueryNode {
    async fn execute(
        &self,
        _node: &Node,
        context: &RunContext,
        _services: &AiServices,
    ) -> WorkflowResult<NodeOutcome> {
        let output = NodeOutput::new().with(NodeOutput::QUERY, context.query());
        Ok(NodeOutcome::output(output))
    }
}
