//! Subcommands.

mod ingest;
mod run;
mod signal;
mod validate;

use std::path::Path;

use anyhow::Context;
use clap::Subcommand;
use kbflow_runtime::graph::WorkflowDefinition;
use serde::{Deserialize, Serialize};

pub use self::ingest::IngestArgs;
pub use self::run::RunArgs;
pub use self::validate::ValidateArgs;
use crate::TRACING_TARGET_COMMAND;
use crate::config::Cli;

/// Command to execute.
#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Validate a workflow and print its execution order.
    Validate(ValidateArgs),
    /// Run a workflow for a single query.
    Run(RunArgs),
    /// Add pre-chunked documents to a collection.
    Ingest(IngestArgs),
}

impl Command {
    /// Returns the subcommand name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validate(_) => "validate",
            Self::Run(_) => "run",
            Self::Ingest(_) => "ingest",
        }
    }
}

/// Executes the parsed subcommand.
pub async fn execute(cli: &Cli) -> anyhow::Result<()> {
    tracing::debug!(
        target: TRACING_TARGET_COMMAND,
        command = cli.command.name(),
        "Executing command"
    );

    match &cli.command {
        Command::Validate(args) => validate::execute(args).await,
        Command::Run(args) => run::execute(cli, args).await,
        Command::Ingest(args) => ingest::execute(cli, args).await,
    }
}

/// Reads and parses a workflow definition file.
async fn load_workflow(path: &Path) -> anyhow::Result<WorkflowDefinition> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read workflow '{}'", path.display()))?;
    let definition = WorkflowDefinition::from_json(&json)
        .with_context(|| format!("failed to parse workflow '{}'", path.display()))?;

    tracing::debug!(
        target: TRACING_TARGET_COMMAND,
        path = %path.display(),
        nodes = definition.nodes.len(),
        edges = definition.edges.len(),
        "Loaded workflow"
    );

    Ok(definition)
}
