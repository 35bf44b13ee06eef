//! Engine-level error types.
//!
//! Per-contract failures are collected into the run report by the service
//! layer; none of these abort a batch run.

use chrono::{DateTime, NaiveDate, Utc};

use crate::db::repository::RepositoryError;
use crate::models::{ContractId, MetricKind, WindowKind};

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Error type for compliance-engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A raw dispatch instruction with a zero-length or inverted interval.
    /// The instruction is rejected; ingestion of the rest of the batch
    /// continues.
    #[error("invalid dispatch interval: start {start} is not before end {end}")]
    InvalidDispatchInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// PROGRAM_DURATION window requested for a program without a start date.
    /// Only that constraint is skipped; all other windows proceed.
    #[error("program start date is not set; cannot anchor the PROGRAM_DURATION window")]
    MissingProgramStartDate,

    /// A configured limit that is neither a plain number nor a min/max pair.
    /// Aborts the whole contract's evaluation for the day.
    #[error("unsupported constraint shape for {metric} over {window}: {raw}")]
    UnsupportedConstraintShape {
        metric: MetricKind,
        window: WindowKind,
        raw: String,
    },

    /// A summary row already exists for this (contract, day) pair. Re-runs
    /// are idempotent: the existing row is left untouched.
    #[error("constraint summary already exists for contract {contract_id} on {day}")]
    DuplicateContractDay {
        contract_id: ContractId,
        day: NaiveDate,
    },

    /// An aggregate query exceeded its deadline. The contract is skipped for
    /// this run and picked up by the next scheduled run.
    #[error("aggregate query timed out after {0:?}")]
    AggregationTimeout(std::time::Duration),

    /// The underlying store failed while serving the evaluation.
    #[error("aggregate query failed: {0}")]
    AggregationQueryFailure(#[from] RepositoryError),
}

impl EngineError {
    /// Short machine-readable kind, used in run-report failure entries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidDispatchInterval { .. } => "invalid_dispatch_interval",
            Self::MissingProgramStartDate => "missing_program_start_date",
            Self::UnsupportedConstraintShape { .. } => "unsupported_constraint_shape",
            Self::DuplicateContractDay { .. } => "duplicate_contract_day",
            Self::AggregationTimeout(_) => "aggregation_timeout",
            Self::AggregationQueryFailure(_) => "aggregation_query_failure",
        }
    }
}
