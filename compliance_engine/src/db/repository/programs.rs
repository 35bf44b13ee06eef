//! Program repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{ProgramConfig, ProgramId};

/// Repository trait for program constraint configuration, owned by program
/// management and read-only for this engine.
#[async_trait]
pub trait ProgramRepository: Send + Sync {
    /// Fetch a program's constraint configuration.
    ///
    /// # Returns
    /// * `Ok(ProgramConfig)` - The program's configured limits
    /// * `Err(RepositoryError::NotFound)` - If no such program exists
    async fn get_program(&self, program_id: ProgramId) -> RepositoryResult<ProgramConfig>;
}
