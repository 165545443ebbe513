//! Workflow execution engine.
//!
//! This module provides the runtime for executing workflows:
//! - [`Engine`]: validates, schedules and runs workflows
//! - [`EngineConfig`]: concurrency and deadline options
//! - [`RunContext`]: the immutable per-run state snapshot
//! - [`RunReport`]: everything a run produced

mod config;
mod context;
mod executor;
mod report;

pub use config::{EngineConfig, EngineConfigBuilder, EngineConfigBuilderError};
pub use context::{ContextConflict, ContextField, ContextPatch, NodeOutput, RunContext};
pub use executor::Engine;
pub use report::{NodeRecord, RunReport};

/// Tracing target for engine operations.
pub const TRACING_TARGET: &str = "kbflow_runtime::engine";
