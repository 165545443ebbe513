//! `LLMEngine` nodes.

use async_trait::async_trait;
use kbflow_core::AiServices;
use kbflow_core::generation::GenerationRequest;

use super::{LlmEngineConfig, NodeExecutor, NodeOutcome, PromptTemplate, TRACING_TARGET};
use crate::engine::{ContextPatch, NodeOutput, RunContext};
use crate::error::{WorkflowError, WorkflowResult};
use crate::graph::Node;

/// Renders a prompt from the query and retrieved documents and generates
/// a response.
#[derive(Debug, Clone, Copy, Default)]
pub struct LlmEngineNode;

impl LlmEngineNode {
    fn request(
        node: &Node,
        config: &LlmEngineConfig,
        prompt: String,
    ) -> WorkflowResult<GenerationRequest> {
        let mut builder = GenerationRequest::builder().with_prompt(prompt);
        if let Some(max_tokens) = config.max_tokens {
            builder = builder.with_max_new_tokens(max_tokens);
        }
        if let Some(model) = config.model() {
            builder = builder.with_model(model);
        }
        if let Some(temperature) = config.temperature {
            builder = builder.with_temperature(temperature);
        }

        builder.build().map_err(|e| WorkflowError::InvalidNodeConfig {
            node_id: node.id.clone(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl NodeExecutor for LlmEngineNode {
    async fn execute(
        &self,
        node: &Node,
        context: &RunContext,
        services: &AiServices,
    ) -> WorkflowResult<NodeOutcome> {
        let config = LlmEngineConfig::from_node(node)?;
        let prompt =
            PromptTemplate::new(config.system_prompt()).render(context.query(), context.kb_docs());
        let request = Self::request(node, &config, prompt)?;

        let response = services
            .generation
            .generate(&request)
            .await
            .map_err(|source| WorkflowError::Generation {
                node_id: node.id.clone(),
                source,
            })?;

        let text = response.strip_prompt(&request.prompt);
        tracing::debug!(
            target: TRACING_TARGET,
            node_id = %node.id,
            response_len = text.len(),
            "Generated response"
        );

        let output = NodeOutput::new().with(NodeOutput::LLM_RESPONSE, text.as_str());
        Ok(NodeOutcome::with_patch(output, ContextPatch::llm_response(text)))
    }
}

#[cfg(test)]
mod tests {
    use kbflow_core::mock::{MockConfig, MockGeneration, MockProvider};

    use super::*;
    use crate::node::{DEFAULT_SYSTEM_PROMPT, NO_CONTEXT};

    #[tokio::test]
    async fn strips_echoed_prompt() {
        let mock = MockProvider::echoing(Vec::<String>::new(), "X is the 24th letter.");
        let services = mock.clone().into_services();
        let context = RunContext::new("What is X?")
            .merge(&"kb".into(), ContextPatch::kb_docs(vec!["X is a letter.".into()]));

        let outcome = LlmEngineNode
            .execute(&Node::llm_engine("llm"), &context, &services)
            .await
            .unwrap();

        assert_eq!(
            outcome.patch.llm_response.as_deref(),
            Some("X is the 24th letter.")
        );
        assert_eq!(
            outcome.output.get_str(NodeOutput::LLM_RESPONSE),
            Some("X is the 24th letter.")
        );

        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].prompt.contains("Context: X is a letter."));
        assert!(prompts[0].prompt.ends_with("Question: What is X?"));
        assert_eq!(prompts[0].max_new_tokens, 256);
    }

    #[tokio::test]
    async fn missing_documents_render_marker() {
        let mock = MockProvider::default();
        let services = mock.clone().into_services();

        LlmEngineNode
            .execute(&Node::llm_engine("llm"), &RunContext::new("q"), &services)
            .await
            .unwrap();

        let prompts = mock.prompts();
        assert_eq!(
            prompts[0].prompt,
            DEFAULT_SYSTEM_PROMPT
                .replace("{kb}", NO_CONTEXT)
                .replace("{query}", "q")
        );
    }

    #[tokio::test]
    async fn forwards_config_to_request() {
        let mock = MockProvider::default();
        let services = mock.clone().into_services();
        let node = Node::llm_engine("llm")
            .with_config("systemPrompt", "Answer: {query}")
            .with_config("maxTokens", 32)
            .with_config("model", "llama3.2")
            .with_config("temperature", 0.3);

        let outcome = LlmEngineNode
            .execute(&node, &RunContext::new("why?"), &services)
            .await
            .unwrap();

        assert_eq!(outcome.patch.llm_response.as_deref(), Some("mock response"));
        let prompts = mock.prompts();
        let request = &prompts[0];
        assert_eq!(request.prompt, "Answer: why?");
        assert_eq!(request.max_new_tokens, 32);
        assert_eq!(request.model.as_deref(), Some("llama3.2"));
        assert_eq!(request.temperature, Some(0.3));
    }

    #[tokio::test]
    async fn zero_max_tokens_is_invalid_config() {
        let services = MockProvider::default().into_services();
        let node = Node::llm_engine("llm").with_config("maxTokens", 0);

        let error = LlmEngineNode
            .execute(&node, &RunContext::new("q"), &services)
            .await
            .unwrap_err();

        assert!(matches!(error, WorkflowError::InvalidNodeConfig { .. }));
    }

    #[tokio::test]
    async fn backend_failure_is_generation_error() {
        let services = MockProvider::new(MockConfig {
            generation: MockGeneration::Fail,
            ..MockConfig::default()
        })
        .into_services();

        let error = LlmEngineNode
            .execute(&Node::llm_engine("llm"), &RunContext::new("q"), &services)
            .await
            .unwrap_err();

        match error {
            WorkflowError::Generation { node_id, .. } => assert_eq!(node_id.as_str(), "llm"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
