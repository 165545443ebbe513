//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── command: Command       # validate | run | ingest
//! ├── log: LogConfig         # Output format
//! ├── engine: EngineArgs     # Concurrency, run deadline
//! ├── ollama: OllamaArgs     # Generation and embeddings
//! └── chroma: ChromaArgs     # Vector store
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

mod chroma;
mod engine;
mod log;
mod ollama;
mod provider;

use std::process;

use anyhow::Context;
pub use chroma::ChromaArgs;
use clap::Parser;
pub use engine::EngineArgs;
pub use log::LogConfig;
pub use ollama::OllamaArgs;
pub use provider::Providers;

use crate::command::Command;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "kbflow")]
#[command(about = "Validate, run and feed retrieval-augmented generation workflows")]
#[command(version)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Logging configuration.
    #[clap(flatten)]
    pub log: LogConfig,

    /// Workflow engine configuration.
    #[clap(flatten)]
    pub engine: EngineArgs,

    /// Ollama configuration for generation and embeddings.
    #[clap(flatten)]
    pub ollama: OllamaArgs,

    /// Chroma configuration for retrieval.
    #[clap(flatten)]
    pub chroma: ChromaArgs,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// This ensures .env files are loaded before clap parses arguments, allowing
    /// environment variables from .env to be used as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing(&self) {
        self.log.init_tracing();
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.engine
            .to_config()
            .context("invalid engine configuration")?;
        self.ollama
            .to_config()
            .context("invalid Ollama configuration")?;
        self.chroma
            .to_config()
            .context("invalid Chroma configuration")?;
        Ok(())
    }

    /// Logs configuration at debug level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            ollama_url = %self.ollama.ollama_url,
            ollama_model = %self.ollama.ollama_model,
            ollama_embedding_model = %self.ollama.ollama_embedding_model,
            chroma_url = %self.chroma.chroma_url,
            max_concurrent_runs = self.engine.max_concurrent_runs,
            run_timeout_secs = ?self.engine.run_timeout_secs,
            "Configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::log::LogFormat;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_validate() {
        let cli = Cli::try_parse_from(["kbflow", "validate", "--workflow", "w.json"]).unwrap();
        assert!(cli.validate().is_ok());
        assert_eq!(cli.log.log_format, LogFormat::Text);
    }

    #[test]
    fn global_flags_precede_subcommand() {
        let cli = Cli::try_parse_from([
            "kbflow",
            "--ollama-model",
            "mistral",
            "--max-concurrent-runs",
            "2",
            "--log-format",
            "json",
            "run",
            "--workflow",
            "w.json",
            "--query",
            "hi",
        ])
        .unwrap();
        assert_eq!(cli.ollama.ollama_model, "mistral");
        assert_eq!(cli.engine.max_concurrent_runs, 2);
        assert_eq!(cli.log.log_format, LogFormat::Json);
    }

    #[test]
    fn zero_concurrency_fails_validation() {
        let cli = Cli::try_parse_from([
            "kbflow",
            "--max-concurrent-runs",
            "0",
            "validate",
            "--workflow",
            "w.json",
        ])
        .unwrap();
        assert!(cli.validate().is_err());
    }
}
