//! Run context snapshots and node outputs.

use derive_more::{Debug, From, Into};
use serde::Serialize;
use serde_json::{Map, Value};
use strum::{AsRefStr, Display};

use crate::graph::NodeId;

/// A context field that nodes may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[derive(AsRefStr, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ContextField {
    /// Documents retrieved by a `KnowledgeBase` node.
    KbDocs,
    /// Text generated by an `LLMEngine` node.
    LlmResponse,
}

/// A value together with the node that wrote it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct Written<T> {
    value: T,
    writer: NodeId,
}

/// The state visible to a node while it executes.
///
/// Contexts are immutable: [`RunContext::merge`] returns a new snapshot,
/// and every later node sees the merged values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunContext {
    query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kb_docs: Option<Written<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    llm_response: Option<Written<String>>,
}

impl RunContext {
    /// Creates the initial context for a run.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            kb_docs: None,
            llm_response: None,
        }
    }

    /// Returns the user query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the retrieved documents, if any node retrieved them.
    pub fn kb_docs(&self) -> Option<&[String]> {
        self.kb_docs.as_ref().map(|docs| docs.value.as_slice())
    }

    /// Returns the generated response, if any node produced one.
    pub fn llm_response(&self) -> Option<&str> {
        self.llm_response
            .as_ref()
            .map(|response| response.value.as_str())
    }

    /// Returns the node that last wrote a field.
    pub fn writer(&self, field: ContextField) -> Option<&NodeId> {
        match field {
            ContextField::KbDocs => self.kb_docs.as_ref().map(|w| &w.writer),
            ContextField::LlmResponse => self.llm_response.as_ref().map(|w| &w.writer),
        }
    }

    /// Returns a new snapshot with the patch applied on top of this one.
    pub fn merge(&self, writer: &NodeId, patch: ContextPatch) -> Self {
        let mut next = self.clone();
        if let Some(value) = patch.kb_docs {
            next.kb_docs = Some(Written {
                value,
                writer: writer.clone(),
            });
        }
        if let Some(value) = patch.llm_response {
            next.llm_response = Some(Written {
                value,
                writer: writer.clone(),
            });
        }
        next
    }
}

/// Context fields a node asks to write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextPatch {
    /// New retrieved documents.
    pub kb_docs: Option<Vec<String>>,
    /// New generated response.
    pub llm_response: Option<String>,
}

impl ContextPatch {
    /// Creates a patch that writes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a patch writing `kbDocs`.
    pub fn kb_docs(docs: Vec<String>) -> Self {
        Self {
            kb_docs: Some(docs),
            ..Self::default()
        }
    }

    /// Creates a patch writing `llmResponse`.
    pub fn llm_response(response: impl Into<String>) -> Self {
        Self {
            llm_response: Some(response.into()),
            ..Self::default()
        }
    }

    /// Returns whether the patch writes nothing.
    pub fn is_empty(&self) -> bool {
        self.kb_docs.is_none() && self.llm_response.is_none()
    }

    /// Returns the fields this patch writes.
    pub fn fields(&self) -> Vec<ContextField> {
        let mut fields = Vec::with_capacity(2);
        if self.kb_docs.is_some() {
            fields.push(ContextField::KbDocs);
        }
        if self.llm_response.is_some() {
            fields.push(ContextField::LlmResponse);
        }
        fields
    }
}

/// A recorded overwrite of a field written by a parallel branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextConflict {
    /// The overwritten field.
    pub field: ContextField,
    /// Node whose value was discarded.
    pub previous_writer: NodeId,
    /// Node whose value was kept.
    pub writer: NodeId,
}

/// The JSON object a node produced.
#[derive(Clone, Default, PartialEq, Serialize, From, Into)]
#[derive(Debug)]
#[debug("{_0:?}")]
#[serde(transparent)]
pub struct NodeOutput(Map<String, Value>);

impl NodeOutput {
    /// Key of the user query.
    pub const QUERY: &'static str = "query";
    /// Key of the retrieved documents.
    pub const KB_DOCS: &'static str = "kbDocs";
    /// Key of the generated response.
    pub const LLM_RESPONSE: &'static str = "llmResponse";
    /// Key of the final answer.
    pub const FINAL_RESPONSE: &'static str = "finalResponse";

    /// Creates an empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns an entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a string entry.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns whether the output has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn merge_leaves_previous_snapshot_untouched() {
        let initial = RunContext::new("q");
        let writer = NodeId::from("kb");
        let next = initial.merge(&writer, ContextPatch::kb_docs(vec!["doc".into()]));

        assert!(initial.kb_docs().is_none());
        assert_eq!(next.kb_docs(), Some(&["doc".to_owned()][..]));
        assert_eq!(next.writer(ContextField::KbDocs), Some(&writer));
        assert_eq!(next.query(), "q");
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let context = RunContext::new("q").merge(&"a".into(), ContextPatch::llm_response("r"));
        let merged = context.merge(&"b".into(), ContextPatch::empty());
        assert_eq!(merged, context);
        assert!(ContextPatch::empty().is_empty());
        assert!(ContextPatch::empty().fields().is_empty());
    }

    #[test]
    fn later_patch_overwrites_writer() {
        let context = RunContext::new("q")
            .merge(&"a".into(), ContextPatch::llm_response("first"))
            .merge(&"b".into(), ContextPatch::llm_response("second"));
        assert_eq!(context.llm_response(), Some("second"));
        assert_eq!(
            context.writer(ContextField::LlmResponse),
            Some(&NodeId::from("b"))
        );
    }

    #[test]
    fn field_names_are_camel_case() {
        assert_eq!(ContextField::KbDocs.as_ref(), "kbDocs");
        assert_eq!(ContextField::LlmResponse.to_string(), "llmResponse");
        assert_eq!(
            ContextPatch::llm_response("r").fields(),
            vec![ContextField::LlmResponse]
        );
    }

    #[test]
    fn context_serializes_with_writers() {
        let context = RunContext::new("q").merge(&"kb".into(), ContextPatch::kb_docs(vec![]));
        assert_eq!(
            serde_json::to_value(&context).unwrap(),
            json!({"query": "q", "kbDocs": {"value": [], "writer": "kb"}})
        );
    }

    #[test]
    fn node_output_accessors() {
        let output = NodeOutput::new().with(NodeOutput::FINAL_RESPONSE, "answer");
        assert_eq!(output.get_str(NodeOutput::FINAL_RESPONSE), Some("answer"));
        assert!(output.get(NodeOutput::QUERY).is_none());
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({"finalResponse": "answer"})
        );
        assert!(NodeOutput::new().is_empty());
    }
}
