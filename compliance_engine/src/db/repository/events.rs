//! Dispatch-event repository trait: storage plus grouped aggregation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::error::RepositoryResult;
use crate::constraints::{AggregateQuantity, EventScope};
use crate::models::{ContractId, DispatchEvent, OptOutResponse};

/// One scalar requested from a grouped aggregate query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateSpec {
    /// Only events with `start_time >= window_start` qualify.
    pub window_start: DateTime<Utc>,
    pub quantity: AggregateQuantity,
}

/// Repository trait for dispatch events, opt-out responses, and the grouped
/// aggregate queries the compliance evaluation runs over them.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait DispatchEventRepository: Send + Sync {
    /// Check if the store connection is healthy.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Persist a batch of day-bounded dispatch events.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of events inserted
    async fn insert_events(&self, events: &[DispatchEvent]) -> RepositoryResult<usize>;

    /// Persist a batch of opt-out responses.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of responses inserted
    async fn insert_opt_out_responses(
        &self,
        responses: &[OptOutResponse],
    ) -> RepositoryResult<usize>;

    /// Run one grouped aggregate pass over a contract's events, producing
    /// one scalar per spec.
    ///
    /// Scope selects the event-level predicate: `DispatchedOnly` excludes
    /// events with a correlated `is_opt_out = true` response (events with no
    /// response at all count as dispatched); `OptedOutOnly` is the
    /// complement. Counts over zero matching rows yield `Some(0)`; sums over
    /// zero rows yield `None`.
    ///
    /// # Returns
    /// * `Ok(Vec<Option<Decimal>>)` - One result per spec, in spec order
    async fn aggregate_events(
        &self,
        contract_id: ContractId,
        scope: EventScope,
        specs: &[AggregateSpec],
    ) -> RepositoryResult<Vec<Option<Decimal>>>;
}
