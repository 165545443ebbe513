//! Engine configuration.

use std::time::Duration;

use derive_builder::Builder;

/// Default number of runs allowed to execute at once.
pub const DEFAULT_MAX_CONCURRENT_RUNS: usize = 10;

/// Configuration for the workflow execution engine.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct EngineConfig {
    /// Maximum number of concurrent workflow executions.
    #[builder(default = "DEFAULT_MAX_CONCURRENT_RUNS")]
    pub max_concurrent_runs: usize,

    /// Deadline applied to every run; `None` runs without one.
    #[builder(default, setter(strip_option))]
    pub default_timeout: Option<Duration>,
}

impl EngineConfig {
    /// Returns a builder for the config.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

impl EngineConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_concurrent_runs == Some(0) {
            return Err("max_concurrent_runs must be at least 1".into());
        }
        if self.default_timeout == Some(Some(Duration::ZERO)) {
            return Err("default_timeout must be greater than zero".into());
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_runs: DEFAULT_MAX_CONCURRENT_RUNS,
            default_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_default() {
        let config = EngineConfig::builder().build().unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_concurrent_runs, 10);
        assert!(config.default_timeout.is_none());
    }

    #[test]
    fn builder_sets_values() {
        let config = EngineConfig::builder()
            .with_max_concurrent_runs(2usize)
            .with_default_timeout(Duration::from_secs(30))
            .build()
            .unwrap();
        assert_eq!(config.max_concurrent_runs, 2);
        assert_eq!(config.default_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let result = EngineConfig::builder()
            .with_max_concurrent_runs(0usize)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let result = EngineConfig::builder()
            .with_default_timeout(Duration::ZERO)
            .build();
        assert!(result.is_err());
    }
}
