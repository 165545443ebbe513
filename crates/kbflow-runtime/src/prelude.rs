//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types for ergonomic imports:
//!
//! ```rust
//! use kbflow_runtime::prelude::*;
//! ```

pub use crate::engine::{
    ContextConflict, ContextPatch, Engine, EngineConfig, NodeOutput, NodeRecord, RunContext,
    RunReport,
};
pub use crate::error::{MalformedGraph, ValidationError, WorkflowError, WorkflowResult};
pub use crate::graph::{Edge, Node, NodeId, NodeKind, WorkflowDefinition, WorkflowGraph};
pub use crate::node::{NodeExecutor, NodeOutcome, execute_node};
