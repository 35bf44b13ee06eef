//! Constraint-summary repository trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::models::{ConstraintSummary, ContractId};

/// Repository trait for persisted constraint summaries.
///
/// Summaries are unique on `(contract_id, day)` and immutable after
/// creation: a re-run for the same day must fail the insert rather than
/// overwrite the existing row.
#[async_trait]
pub trait SummaryRepository: Send + Sync {
    /// Insert a new summary row.
    ///
    /// # Returns
    /// * `Ok(())` - Row created
    /// * `Err(RepositoryError::DuplicateKey)` - A row already exists for
    ///   this (contract, day)
    async fn insert_summary(&self, summary: &ConstraintSummary) -> RepositoryResult<()>;

    /// Fetch the summary for a (contract, day), if any.
    async fn get_summary(
        &self,
        contract_id: ContractId,
        day: NaiveDate,
    ) -> RepositoryResult<Option<ConstraintSummary>>;

    /// Check whether a summary exists for a (contract, day).
    async fn has_summary(&self, contract_id: ContractId, day: NaiveDate)
        -> RepositoryResult<bool>;
}
