//! Node identifiers, kinds and declarations.

use std::fmt;

use derive_more::{Debug, Display, From, Into};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Identifier of a node, unique within a workflow.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a node ID from any string.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The behavior a node runs with.
///
/// Unrecognized type strings are kept as [`NodeKind::Unknown`] so that
/// definitions authored for newer hosts still load and run.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    /// Exposes the user query.
    UserQuery,
    /// Retrieves documents from a collection.
    KnowledgeBase,
    /// Renders a prompt and generates an answer.
    LlmEngine,
    /// Emits the generated answer.
    Output,
    /// Any other type string.
    Unknown(String),
}

impl NodeKind {
    /// Returns the wire name of the kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::UserQuery => "UserQuery",
            Self::KnowledgeBase => "KnowledgeBase",
            Self::LlmEngine => "LLMEngine",
            Self::Output => "Output",
            Self::Unknown(kind) => kind,
        }
    }

    /// Returns whether the kind has a built-in executor.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<&str> for NodeKind {
    fn from(kind: &str) -> Self {
        match kind {
            "UserQuery" => Self::UserQuery,
            "KnowledgeBase" => Self::KnowledgeBase,
            "LLMEngine" => Self::LlmEngine,
            "Output" => Self::Output,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

impl From<String> for NodeKind {
    fn from(kind: String) -> Self {
        match Self::from(kind.as_str()) {
            Self::Unknown(_) => Self::Unknown(kind),
            known => known,
        }
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Unknown(kind) => kind,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node declaration inside a workflow definition.
///
/// Unknown JSON fields are ignored; a missing or `null` config is an
/// empty map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node identifier.
    pub id: NodeId,
    /// Node behavior, serialized as `type`.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Kind-specific settings.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Map::is_empty"
    )]
    pub config: Map<String, Value>,
}

impl Node {
    /// Creates a node with an empty config.
    pub fn new(id: impl Into<NodeId>, kind: impl Into<NodeKind>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            config: Map::new(),
        }
    }

    /// Creates a `UserQuery` node.
    pub fn user_query(id: impl Into<NodeId>) -> Self {
        Self::new(id, NodeKind::UserQuery)
    }

    /// Creates a `KnowledgeBase` node.
    pub fn knowledge_base(id: impl Into<NodeId>) -> Self {
        Self::new(id, NodeKind::KnowledgeBase)
    }

    /// Creates an `LLMEngine` node.
    pub fn llm_engine(id: impl Into<NodeId>) -> Self {
        Self::new(id, NodeKind::LlmEngine)
    }

    /// Creates an `Output` node.
    pub fn output(id: impl Into<NodeId>) -> Self {
        Self::new(id, NodeKind::Output)
    }

    /// Sets a config entry.
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Map<String, Value>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
