#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;

use std::process;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "kbflow_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "kbflow_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "kbflow_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "kbflow_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %format!("{error:#}"),
            "application terminated with error"
        );
    }
    eprintln!("Error: {error:#}");

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    cli.init_tracing();
    cli.log();
    cli.validate()?;

    command::execute(&cli).await
}
