//! Engine configuration file support.
//!
//! Reads engine configuration from TOML, with environment-variable
//! fallbacks for containerized deployments.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use super::repository::RepositoryError;

/// Engine configuration from file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub evaluation: EvaluationSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default = "default_repo_type")]
    pub repo_type: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: default_repo_type(),
        }
    }
}

/// Daily-evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSettings {
    /// Active-contract page size for the batch stream.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Contracts evaluated concurrently within a page.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Deadline for a single aggregate query, in seconds.
    #[serde(default = "default_aggregate_timeout")]
    pub aggregate_timeout_secs: u64,
}

fn default_repo_type() -> String {
    "local".to_string()
}

fn default_batch_size() -> usize {
    100
}

fn default_concurrency() -> usize {
    4
}

fn default_aggregate_timeout() -> u64 {
    30
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
            aggregate_timeout_secs: default_aggregate_timeout(),
        }
    }
}

impl EvaluationSettings {
    pub fn aggregate_timeout(&self) -> Duration {
        Duration::from_secs(self.aggregate_timeout_secs)
    }
}

impl EngineConfig {
    /// Load engine configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(EngineConfig)` if successful
    /// * `Err(RepositoryError)` if the file cannot be read or parsed
    pub fn from_file(path: &Path) -> Result<Self, RepositoryError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            RepositoryError::ConfigurationError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&contents).map_err(|e| {
            RepositoryError::ConfigurationError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Build configuration from environment variables, falling back to
    /// defaults. Recognized variables: `COMPLIANCE_REPOSITORY_TYPE`,
    /// `COMPLIANCE_BATCH_SIZE`, `COMPLIANCE_CONCURRENCY`,
    /// `COMPLIANCE_AGGREGATE_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("COMPLIANCE_REPOSITORY_TYPE") {
            config.repository.repo_type = v;
        }
        if let Some(v) = env_parse("COMPLIANCE_BATCH_SIZE") {
            config.evaluation.batch_size = v;
        }
        if let Some(v) = env_parse("COMPLIANCE_CONCURRENCY") {
            config.evaluation.concurrency = v;
        }
        if let Some(v) = env_parse("COMPLIANCE_AGGREGATE_TIMEOUT_SECS") {
            config.evaluation.aggregate_timeout_secs = v;
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
