//! Chroma configuration.

use std::time::Duration;

use derive_builder::Builder;
use url::Url;

use crate::error::{VectorError, VectorResult};

/// Default Chroma server address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Tenant every Chroma server creates on first start.
pub const DEFAULT_TENANT: &str = "default_tenant";

/// Database every Chroma server creates on first start.
pub const DEFAULT_DATABASE: &str = "default_database";

/// Chroma configuration.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ChromaConfig {
    /// Base URL of the Chroma server.
    #[builder(default = "DEFAULT_BASE_URL.to_owned()")]
    pub base_url: String,
    /// Tenant owning the database.
    #[builder(default = "DEFAULT_TENANT.to_owned()")]
    pub tenant: String,
    /// Database holding the collections.
    #[builder(default = "DEFAULT_DATABASE.to_owned()")]
    pub database: String,
    /// Request timeout.
    #[builder(default = "Duration::from_secs(30)")]
    pub timeout: Duration,
    /// User agent string for requests.
    #[builder(default = "ChromaConfig::default_user_agent()")]
    pub user_agent: String,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            tenant: DEFAULT_TENANT.to_owned(),
            database: DEFAULT_DATABASE.to_owned(),
            timeout: Duration::from_secs(30),
            user_agent: Self::default_user_agent(),
        }
    }
}

impl ChromaConfig {
    /// Creates a configuration for the given server.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Returns a builder for the config.
    pub fn builder() -> ChromaConfigBuilder {
        ChromaConfigBuilder::default()
    }

    fn default_user_agent() -> String {
        format!("kbflow-vector/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Resolves an API path against the base URL.
    pub fn endpoint(&self, path: &str) -> VectorResult<Url> {
        let mut base = Url::parse(&self.base_url).map_err(|e| {
            VectorError::invalid_config(format!("invalid base URL '{}': {}", self.base_url, e))
        })?;
        if !base.path().ends_with('/') {
            let normalized = format!("{}/", base.path());
            base.set_path(&normalized);
        }
        base.join(path)
            .map_err(|e| VectorError::invalid_config(format!("invalid endpoint '{}': {}", path, e)))
    }

    /// Resolves the v2 collections route of the configured tenant and
    /// database, followed by `segments`.
    ///
    /// Segments are percent-encoded, so tenant and database names may hold
    /// any characters.
    pub fn collections_endpoint(&self, segments: &[&str]) -> VectorResult<Url> {
        let mut url = self.endpoint("api/v2/")?;
        url.path_segments_mut()
            .map_err(|()| {
                VectorError::invalid_config(format!(
                    "base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend([
                "tenants",
                self.tenant.as_str(),
                "databases",
                self.database.as_str(),
                "collections",
            ])
            .extend(segments);
        Ok(url)
    }
}

impl ChromaConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(base_url) = &self.base_url
            && let Err(e) = Url::parse(base_url)
        {
            return Err(format!("invalid base URL '{}': {}", base_url, e));
        }
        if let Some(timeout) = &self.timeout
            && timeout.is_zero()
        {
            return Err("timeout must be greater than 0".into());
        }
        if let Some(tenant) = &self.tenant
            && tenant.trim().is_empty()
        {
            return Err("tenant must not be empty".into());
        }
        if let Some(database) = &self.database
            && database.trim().is_empty()
        {
            return Err("database must not be empty".into());
        }
        Ok(())
    }
}
