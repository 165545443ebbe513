//! `kbflow run`.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use kbflow_runtime::engine::{Engine, RunReport};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::load_workflow;
use super::signal::cancel_on_signal;
use crate::TRACING_TARGET_COMMAND;
use crate::config::{Cli, Providers};

/// Arguments for `kbflow run`.
#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct RunArgs {
    /// Path to the workflow definition JSON.
    #[arg(long, short)]
    pub workflow: PathBuf,

    /// The user's question.
    #[arg(long, short)]
    pub query: String,

    /// Print the full run report as JSON instead of the answer.
    #[arg(long)]
    #[serde(default)]
    pub report: bool,

    /// Skip the Ollama and Chroma reachability check before the run.
    #[arg(long)]
    #[serde(default)]
    pub skip_health_check: bool,
}

pub(super) async fn execute(cli: &Cli, args: &RunArgs) -> anyhow::Result<()> {
    let definition = load_workflow(&args.workflow).await?;
    let providers = Providers::new(&cli.ollama, &cli.chroma)?;
    if !args.skip_health_check {
        providers.check().await?;
    }
    let services = providers.into_ai_services();
    let engine = Engine::new(cli.engine.to_config()?, services);

    let cancel = CancellationToken::new();
    let signal = cancel_on_signal(cancel.clone());
    let result = engine
        .execute_with_cancellation(&definition, &args.query, cancel)
        .await;
    signal.abort();

    let report = result.context("workflow run failed")?;
    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        run_id = %report.run_id,
        nodes = report.order.len(),
        conflicts = report.conflicts.len(),
        elapsed_ms = report.duration().as_millis() as i64,
        "Workflow run completed"
    );

    println!("{}", render(&report, args.report)?);
    Ok(())
}

fn render(report: &RunReport, full: bool) -> anyhow::Result<String> {
    if full {
        return serde_json::to_string_pretty(report).context("failed to serialize run report");
    }
    Ok(report.answer.clone())
}
