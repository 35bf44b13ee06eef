//! Contract repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Contract, ContractId};

/// Repository trait for enrollment contracts.
///
/// The daily evaluation streams active contracts in bounded batches so the
/// full active set is never held in memory at once.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ContractRepository: Send + Sync {
    /// Fetch one page of contracts in the active state, ordered by
    /// contract id for stable pagination.
    ///
    /// # Arguments
    /// * `offset` - Number of active contracts to skip
    /// * `limit` - Maximum page size
    async fn fetch_active_contracts(
        &self,
        offset: usize,
        limit: usize,
    ) -> RepositoryResult<Vec<Contract>>;

    /// Check whether a contract exists at all (any state). Ingestion uses
    /// this to drop events from stale upstream feeds.
    async fn contract_exists(&self, contract_id: ContractId) -> RepositoryResult<bool>;
}
