//! `Output` nodes.

use async_trait::async_trait;
use kbflow_core::AiServices;

use super::{NodeExecutor, NodeOutcome};
use crate::engine::{NodeOutput, RunContext};
use crate::error::WorkflowResult;
use crate::graph::Node;

/// Emits the generated response, or an empty string when none exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputNode;

#[async_trait]
impl NodeExecutor for OutputNode {
    async fn execute(
        &self,
        _node: &Node,
        context: &RunContext,
        _services: &AiServices,
    ) -> WorkflowResult<NodeOutcome> {
        let answer = context.llm_response().unwrap_or_default();
        let output = NodeOutput::new().with(NodeOutput::FINAL_RESPONSE, answer);
        Ok(NodeOutcome::output(output))
    }
}
