//! Ingestion-time pipeline: normalizes raw dispatch instructions into
//! day-bounded events and persists them.
//!
//! Ingestion is best-effort over a batch from the upstream feed: invalid
//! instructions are logged and skipped, instructions referencing contracts
//! the store does not know are dropped silently (the feed may carry stale
//! contracts), and the rest is persisted. There is no retry or rollback of
//! partial writes here; that is the upstream boundary's responsibility.

pub mod normalizer;

pub use normalizer::normalize;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::{OptOutResponse, RawDispatchInstruction};

/// Outcome counts for one ingestion batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Day-bounded events persisted to the store.
    pub accepted_events: usize,
    /// Instructions dropped because their contract is unknown.
    pub dropped_unknown_contract: usize,
    /// Instructions rejected for an invalid interval.
    pub rejected_instructions: usize,
}

/// Normalize and persist a batch of raw dispatch instructions.
///
/// Returns `Err` only for store failures; bad instructions never fail the
/// batch.
pub async fn ingest_instructions<R: FullRepository>(
    repo: &R,
    instructions: &[RawDispatchInstruction],
) -> RepositoryResult<IngestReport> {
    let mut report = IngestReport::default();
    let mut events = Vec::new();

    for instruction in instructions {
        let normalized = match normalize(instruction) {
            Ok(normalized) => normalized,
            Err(e) => {
                warn!(
                    "rejecting dispatch instruction {} for contract {}: {}",
                    instruction.event_id, instruction.contract_id, e
                );
                report.rejected_instructions += 1;
                continue;
            }
        };

        if !repo.contract_exists(instruction.contract_id).await? {
            debug!(
                "dropping dispatch instruction {}: contract {} not found",
                instruction.event_id, instruction.contract_id
            );
            report.dropped_unknown_contract += 1;
            continue;
        }

        events.extend(normalized);
    }

    if !events.is_empty() {
        report.accepted_events = repo.insert_events(&events).await?;
    }

    info!(
        "ingested batch: {} events accepted, {} unknown-contract drops, {} rejects",
        report.accepted_events, report.dropped_unknown_contract, report.rejected_instructions
    );
    Ok(report)
}

/// Persist a batch of opt-out responses.
pub async fn ingest_opt_out_responses<R: FullRepository>(
    repo: &R,
    responses: &[OptOutResponse],
) -> RepositoryResult<usize> {
    repo.insert_opt_out_responses(responses).await
}
