//! Typed node configs parsed from the free-form `config` map.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{WorkflowError, WorkflowResult};
use crate::graph::Node;

/// Collection used when a node names none, or names one that is too short.
pub const DEFAULT_COLLECTION_NAME: &str = "knowledge_base";

/// Shortest accepted collection name, in characters.
pub const MIN_COLLECTION_NAME_LEN: usize = 3;

/// Number of documents retrieved when `k` is absent.
pub const DEFAULT_TOP_K: usize = 5;

/// Template used when a node has no usable `systemPrompt`.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer the question based on the context provided.\n\nContext: {kb}\n\nQuestion: {query}";

fn parse<T: DeserializeOwned>(node: &Node) -> WorkflowResult<T> {
    serde_json::from_value(Value::Object(node.config.clone())).map_err(|e| {
        WorkflowError::InvalidNodeConfig {
            node_id: node.id.clone(),
            message: e.to_string(),
        }
    })
}

/// Settings of a `KnowledgeBase` node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseConfig {
    /// Collection to query.
    #[serde(default)]
    pub collection_name: Option<String>,
    /// Maximum number of documents to retrieve.
    #[serde(default)]
    pub k: Option<usize>,
}

impl KnowledgeBaseConfig {
    /// Parses and checks the config of `node`.
    pub fn from_node(node: &Node) -> WorkflowResult<Self> {
        let config: Self = parse(node)?;
        if config.k == Some(0) {
            return Err(WorkflowError::InvalidNodeConfig {
                node_id: node.id.clone(),
                message: "k must be at least 1".into(),
            });
        }
        Ok(config)
    }

    /// Returns the collection to query.
    pub fn collection_name(&self) -> &str {
        match self.collection_name.as_deref() {
            Some(name) if name.chars().count() >= MIN_COLLECTION_NAME_LEN => name,
            _ => DEFAULT_COLLECTION_NAME,
        }
    }

    /// Returns the number of documents to retrieve.
    pub fn top_k(&self) -> usize {
        self.k.unwrap_or(DEFAULT_TOP_K)
    }
}

/// Settings of an `LLMEngine` node.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmEngineConfig {
    /// Prompt template with `{query}` and `{kb}` placeholders.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Upper bound on generated tokens.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Model override.
    #[serde(default)]
    pub model: Option<String>,
    /// Sampling temperature override.
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl LlmEngineConfig {
    /// Parses the config of `node`.
    pub fn from_node(node: &Node) -> WorkflowResult<Self> {
        parse(node)
    }

    /// Returns the prompt template; blank templates count as absent.
    pub fn system_prompt(&self) -> &str {
        match self.system_prompt.as_deref() {
            Some(template) if !template.trim().is_empty() => template,
            _ => DEFAULT_SYSTEM_PROMPT,
        }
    }

    /// Returns the model override, ignoring blank names.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref().filter(|model| !model.trim().is_empty())
    }
}
