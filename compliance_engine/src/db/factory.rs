//! Repository factory for dependency injection.
//!
//! Creates repository instances based on runtime configuration. A SQL
//! backend slots in here as a new `RepositoryType` variant without touching
//! the evaluation or ingestion services.

use std::sync::Arc;

use super::config::EngineConfig;
use super::repositories::LocalRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory repository for tests and local development
    Local,
}

impl RepositoryType {
    /// Parse repository type from string.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

/// Repository factory for creating repository instances.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance from engine configuration.
    ///
    /// # Returns
    /// * `Ok(Arc<dyn FullRepository>)` - Boxed repository instance
    /// * `Err(RepositoryError)` - If the configured type is unknown
    pub fn create(config: &EngineConfig) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = RepositoryType::parse(&config.repository.repo_type)
            .map_err(RepositoryError::ConfigurationError)?;
        match repo_type {
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create an in-memory local repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }
}
