//! Workflow engine configuration.

use std::time::Duration;

use clap::Args;
use kbflow_runtime::engine::EngineConfig;
use serde::{Deserialize, Serialize};

/// Workflow engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct EngineArgs {
    /// Maximum number of workflow runs executing at once.
    #[arg(long, env = "MAX_CONCURRENT_RUNS", default_value_t = 10)]
    #[serde(default = "default_max_concurrent_runs")]
    pub max_concurrent_runs: usize,

    /// Deadline for a single run, in seconds.
    #[arg(long = "run-timeout", env = "RUN_TIMEOUT")]
    pub run_timeout_secs: Option<u64>,
}

fn default_max_concurrent_runs() -> usize {
    10
}

impl EngineArgs {
    /// Builds the engine configuration.
    pub fn to_config(&self) -> anyhow::Result<EngineConfig> {
        let mut builder = EngineConfig::builder().with_max_concurrent_runs(self.max_concurrent_runs);
        if let Some(secs) = self.run_timeout_secs {
            builder = builder.with_default_timeout(Duration::from_secs(secs));
        }
        Ok(builder.build()?)
    }
}
