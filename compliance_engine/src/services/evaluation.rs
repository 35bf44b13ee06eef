//! Daily compliance evaluation orchestration.
//!
//! `run_daily_evaluation` is the engine's only entry point for the external
//! scheduler. It streams active contracts in bounded pages, evaluates each
//! contract independently (constraint build → grouped aggregation → summary
//! insert), and collects per-contract failures into a run report instead of
//! aborting the batch. Re-running a day is idempotent: contracts that
//! already have a summary row are counted as skipped.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constraints::{build_constraints, Constraint, EventScope};
use crate::db::config::EvaluationSettings;
use crate::db::repository::{AggregateSpec, FullRepository, RepositoryError};
use crate::error::{EngineError, EngineResult};
use crate::models::{ConstraintSummary, Contract, ContractId};

/// Tuning knobs for a daily run.
#[derive(Debug, Clone)]
pub struct EvaluationOptions {
    /// Active-contract page size.
    pub batch_size: usize,
    /// Contracts evaluated concurrently within a page. Evaluations touch
    /// distinct (contract, day) rows, so this is safe at any isolation level
    /// that hides uncommitted event writes.
    pub concurrency: usize,
    /// Deadline per aggregate query; a timed-out contract is skipped for
    /// this run, not retried.
    pub aggregate_timeout: Duration,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        EvaluationSettings::default().into()
    }
}

impl From<EvaluationSettings> for EvaluationOptions {
    fn from(settings: EvaluationSettings) -> Self {
        Self {
            batch_size: settings.batch_size.max(1),
            concurrency: settings.concurrency.max(1),
            aggregate_timeout: settings.aggregate_timeout(),
        }
    }
}

/// One failed contract in a run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractFailure {
    pub contract_id: ContractId,
    /// Machine-readable failure kind (see [`EngineError::kind`]).
    pub kind: String,
    pub message: String,
}

/// Operational outcome of one daily run, consumed by the external scheduler
/// or alerting around it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub evaluation_date: NaiveDate,
    /// Contracts with a freshly persisted summary.
    pub succeeded: usize,
    /// Contracts skipped because their summary for this day already exists.
    pub skipped: usize,
    /// Contracts that failed and are left for the next scheduled run.
    pub failed: usize,
    pub failures: Vec<ContractFailure>,
    /// Set when the contract stream itself failed and the run stopped early.
    pub run_error: Option<String>,
}

impl RunReport {
    fn new(evaluation_date: NaiveDate) -> Self {
        Self {
            evaluation_date,
            succeeded: 0,
            skipped: 0,
            failed: 0,
            failures: Vec::new(),
            run_error: None,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.run_error.is_none()
    }
}

/// Evaluate every active contract for one day and persist its constraint
/// summary. The only entry point callable by the external scheduler.
pub async fn run_daily_evaluation<R: FullRepository>(
    repo: &R,
    evaluation_date: NaiveDate,
    options: &EvaluationOptions,
) -> RunReport {
    info!(
        "starting daily compliance evaluation for {} (batch_size={}, concurrency={})",
        evaluation_date, options.batch_size, options.concurrency
    );
    let mut report = RunReport::new(evaluation_date);
    let mut offset = 0usize;

    loop {
        let page = match repo.fetch_active_contracts(offset, options.batch_size).await {
            Ok(page) => page,
            Err(e) => {
                error!("aborting run, failed to fetch active contracts: {}", e);
                report.run_error = Some(e.to_string());
                break;
            }
        };
        if page.is_empty() {
            break;
        }
        let page_len = page.len();

        let results: Vec<(ContractId, EngineResult<ConstraintSummary>)> =
            stream::iter(page.into_iter())
                .map(|contract| async move {
                    let contract_id = contract.contract_id;
                    let result =
                        evaluate_contract(repo, &contract, evaluation_date, options).await;
                    (contract_id, result)
                })
                .buffer_unordered(options.concurrency)
                .collect()
                .await;

        for (contract_id, result) in results {
            match result {
                Ok(_) => report.succeeded += 1,
                Err(EngineError::DuplicateContractDay { .. }) => {
                    debug!(
                        "contract {}: summary for {} already exists, skipping",
                        contract_id, evaluation_date
                    );
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!("contract {}: evaluation failed: {}", contract_id, e);
                    report.failed += 1;
                    report.failures.push(ContractFailure {
                        contract_id,
                        kind: e.kind().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        if page_len < options.batch_size {
            break;
        }
        offset += page_len;
    }

    info!(
        "daily compliance evaluation for {} finished: {} succeeded, {} skipped, {} failed",
        evaluation_date, report.succeeded, report.skipped, report.failed
    );
    report
}

/// Evaluate one contract for one day and persist its summary.
///
/// Nothing is persisted for the contract unless every configured constraint
/// was aggregated and evaluated.
pub async fn evaluate_contract<R: FullRepository>(
    repo: &R,
    contract: &Contract,
    evaluation_date: NaiveDate,
    options: &EvaluationOptions,
) -> EngineResult<ConstraintSummary> {
    if repo.has_summary(contract.contract_id, evaluation_date).await? {
        return Err(EngineError::DuplicateContractDay {
            contract_id: contract.contract_id,
            day: evaluation_date,
        });
    }

    let program = repo.get_program(contract.program_id).await?;
    let mut set = build_constraints(evaluation_date, &program)?;

    fill_group(
        repo,
        contract.contract_id,
        EventScope::DispatchedOnly,
        &mut set.dispatched_sums,
        options.aggregate_timeout,
    )
    .await?;
    fill_group(
        repo,
        contract.contract_id,
        EventScope::DispatchedOnly,
        &mut set.dispatched_counts,
        options.aggregate_timeout,
    )
    .await?;
    fill_group(
        repo,
        contract.contract_id,
        EventScope::OptedOutOnly,
        &mut set.opted_out_counts,
        options.aggregate_timeout,
    )
    .await?;

    let summary = ConstraintSummary::build(contract.contract_id, evaluation_date, set.iter());
    match repo.insert_summary(&summary).await {
        Ok(()) => Ok(summary),
        // Lost a race with a concurrent run for the same day.
        Err(RepositoryError::DuplicateKey(_)) => Err(EngineError::DuplicateContractDay {
            contract_id: contract.contract_id,
            day: evaluation_date,
        }),
        Err(e) => Err(e.into()),
    }
}

/// Run one grouped aggregate query for a constraint group and inject the
/// results.
async fn fill_group<R: FullRepository>(
    repo: &R,
    contract_id: ContractId,
    scope: EventScope,
    constraints: &mut [Constraint],
    deadline: Duration,
) -> EngineResult<()> {
    if constraints.is_empty() {
        return Ok(());
    }

    let specs: Vec<AggregateSpec> = constraints
        .iter()
        .map(|c| AggregateSpec {
            window_start: c.window_start,
            quantity: c.quantity,
        })
        .collect();

    let values = tokio::time::timeout(deadline, repo.aggregate_events(contract_id, scope, &specs))
        .await
        .map_err(|_| EngineError::AggregationTimeout(deadline))??;

    // A short result vector would leave constraints silently unevaluated,
    // indistinguishable from "not configured" in the summary.
    if values.len() != constraints.len() {
        return Err(EngineError::AggregationQueryFailure(
            RepositoryError::InternalError(format!(
                "aggregate returned {} results for {} specs",
                values.len(),
                constraints.len()
            )),
        ));
    }

    for (constraint, value) in constraints.iter_mut().zip(values) {
        constraint.set_value(value);
    }
    Ok(())
}
