//! Chroma configuration.

use std::time::Duration;

use clap::Args;
use kbflow_vector::ChromaConfig;
use serde::{Deserialize, Serialize};

/// Chroma configuration for retrieval and ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct ChromaArgs {
    /// Base URL of the Chroma server.
    #[arg(long, env = "CHROMA_URL", default_value = "http://localhost:8000")]
    pub chroma_url: String,

    /// Tenant owning the database.
    #[arg(long, env = "CHROMA_TENANT", default_value = "default_tenant")]
    pub chroma_tenant: String,

    /// Database holding the collections.
    #[arg(long, env = "CHROMA_DATABASE", default_value = "default_database")]
    pub chroma_database: String,

    /// Request timeout in seconds.
    #[arg(long = "chroma-timeout", env = "CHROMA_TIMEOUT", default_value_t = 30)]
    pub chroma_timeout_secs: u64,
}

impl ChromaArgs {
    /// Builds the store configuration.
    pub fn to_config(&self) -> anyhow::Result<ChromaConfig> {
        let config = ChromaConfig::builder()
            .with_base_url(self.chroma_url.as_str())
            .with_tenant(self.chroma_tenant.as_str())
            .with_database(self.chroma_database.as_str())
            .with_timeout(Duration::from_secs(self.chroma_timeout_secs))
            .build()?;
        Ok(config)
    }
}
