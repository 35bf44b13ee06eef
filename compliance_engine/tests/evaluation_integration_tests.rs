//! End-to-end evaluation scenarios against the in-memory repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use std::time::Duration;

use der_compliance::constraints::EventScope;
use der_compliance::db::{
    AggregateSpec, ContractRepository, DispatchEventRepository, LocalRepository, ProgramRepository,
    RepositoryResult, SummaryRepository,
};
use der_compliance::models::{
    Contract, ContractId, ContractStatus, ConstraintSummary, DerId, DispatchEvent,
    MetricKind, OptOutResponse, ProgramConfig, ProgramId, WindowKind,
};
use der_compliance::services::{run_daily_evaluation, EvaluationOptions};

const EVAL_DAY: (i32, u32, u32) = (2023, 2, 24);

fn eval_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(EVAL_DAY.0, EVAL_DAY.1, EVAL_DAY.2).unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn seed_contract(repo: &LocalRepository) -> Contract {
    let contract = Contract {
        contract_id: ContractId(1),
        program_id: ProgramId(7),
        status: ContractStatus::Active,
    };
    repo.seed_contract(contract.clone());
    contract
}

fn base_program() -> ProgramConfig {
    let mut program = ProgramConfig::empty(ProgramId(7));
    // Program started roughly 2000 hours before the evaluation date.
    program.start_date = NaiveDate::from_ymd_opt(2022, 12, 3);
    program
}

/// 100 back-to-back one-hour events ending 2023-02-24 23:59:00 UTC, all on
/// contract 1, command value 1.00 (60 minutes / 60 energy each). 23 of them
/// start on the evaluation day; all 100 fall inside its ISO week (Feb 20+).
async fn seed_hourly_history(repo: &LocalRepository) {
    let final_end: DateTime<Utc> = Utc.with_ymd_and_hms(2023, 2, 24, 23, 59, 0).unwrap();
    let mut events = Vec::new();
    for k in 0..100i64 {
        let end = final_end - chrono::Duration::hours(k);
        let start = end - chrono::Duration::hours(1);
        events.push(DispatchEvent {
            event_id: format!("evt-{k}"),
            contract_id: ContractId(1),
            control_id: format!("ctl-{k}"),
            start_time: start,
            end_time: end,
            command_value: dec("1.00"),
            cumulative_duration_minutes: dec("60"),
            total_energy: dec("60.00"),
            status: "completed".to_string(),
            control_type: "load_shed".to_string(),
        });
    }
    repo.insert_events(&events).await.unwrap();
}

/// Opt out every second event (odd indices in the hourly history).
async fn seed_alternating_opt_outs(repo: &LocalRepository) {
    let responses: Vec<OptOutResponse> = (0..100i64)
        .filter(|k| k % 2 == 1)
        .map(|k| OptOutResponse {
            control_id: format!("ctl-{k}"),
            der_id: DerId(k),
            is_opt_out: true,
            response_time: Utc.with_ymd_and_hms(2023, 2, 24, 0, 0, 0).unwrap(),
        })
        .collect();
    repo.insert_opt_out_responses(&responses).await.unwrap();
}

async fn fetch_summary(repo: &LocalRepository) -> ConstraintSummary {
    repo.get_summary(ContractId(1), eval_date())
        .await
        .unwrap()
        .expect("summary should exist")
}

#[tokio::test]
async fn test_window_boundary_counts_and_week_duration() {
    let repo = LocalRepository::new();
    seed_contract(&repo);
    let mut program = base_program();
    program
        .max_number_of_events_per_timeperiod
        .insert(WindowKind::Day, json!(10));
    program
        .cumulative_event_duration
        .insert(WindowKind::Week, json!({"max": 10000}));
    repo.seed_program(program);
    seed_hourly_history(&repo).await;

    let report =
        run_daily_evaluation(&repo, eval_date(), &EvaluationOptions::default()).await;
    assert_eq!(report.succeeded, 1);
    assert!(report.is_clean());

    let summary = fetch_summary(&repo).await;
    let day_count = summary.outcome(MetricKind::MaxNumberOfEventsPerTimeperiod, WindowKind::Day);
    assert_eq!(day_count.value, Some(dec("23")));
    assert_eq!(day_count.violation, Some(true)); // 23 > 10
    assert_eq!(day_count.warning, Some(true)); // ratio 2.3 >= 0.75

    let week_minutes = summary.outcome(MetricKind::CumulativeEventDuration, WindowKind::Week);
    assert_eq!(week_minutes.value, Some(dec("6000")));
    assert_eq!(week_minutes.violation, Some(false));
}

#[tokio::test]
async fn test_opt_out_partition_is_complementary() {
    let repo = LocalRepository::new();
    seed_contract(&repo);
    let mut program = base_program();
    program
        .max_number_of_events_per_timeperiod
        .insert(WindowKind::Day, json!(10));
    program.opt_out_limits.insert(WindowKind::Day, json!(5));
    repo.seed_program(program);
    seed_hourly_history(&repo).await;
    seed_alternating_opt_outs(&repo).await;

    let report =
        run_daily_evaluation(&repo, eval_date(), &EvaluationOptions::default()).await;
    assert_eq!(report.succeeded, 1);

    // 23 events start on the evaluation day; opting out every second event
    // leaves 12 dispatched and 11 opted out, never double-counted.
    let summary = fetch_summary(&repo).await;
    let opted = summary.outcome(MetricKind::OptOuts, WindowKind::Day);
    assert_eq!(opted.value, Some(dec("11")));
    assert_eq!(opted.violation, Some(true)); // 11 > 5

    let dispatched =
        summary.outcome(MetricKind::MaxNumberOfEventsPerTimeperiod, WindowKind::Day);
    assert_eq!(dispatched.value, Some(dec("12")));
}

#[tokio::test]
async fn test_demand_energy_aggregation_over_week() {
    let repo = LocalRepository::new();
    seed_contract(&repo);
    let mut program = base_program();
    program.demand_management = Some(der_compliance::models::DemandManagement {
        max_total_energy_per_timeperiod: json!(600),
        window: WindowKind::Week,
    });
    repo.seed_program(program);
    seed_hourly_history(&repo).await;

    let report =
        run_daily_evaluation(&repo, eval_date(), &EvaluationOptions::default()).await;
    assert_eq!(report.succeeded, 1);

    let summary = fetch_summary(&repo).await;
    let energy = summary.outcome(MetricKind::MaxTotalEnergyPerTimeperiod, WindowKind::Week);
    assert_eq!(energy.value, Some(dec("6000.00")));
    assert_eq!(energy.violation, Some(true)); // 6000 > 600
}

#[tokio::test]
async fn test_rerun_is_idempotent_and_keeps_first_row() {
    let repo = LocalRepository::new();
    seed_contract(&repo);
    let mut program = base_program();
    program
        .max_number_of_events_per_timeperiod
        .insert(WindowKind::Day, json!(10));
    repo.seed_program(program);
    seed_hourly_history(&repo).await;

    let first = run_daily_evaluation(&repo, eval_date(), &EvaluationOptions::default()).await;
    assert_eq!((first.succeeded, first.skipped), (1, 0));
    let first_row = fetch_summary(&repo).await;

    // More events arriving after the snapshot must not change it on re-run.
    seed_hourly_history(&repo).await;
    let second = run_daily_evaluation(&repo, eval_date(), &EvaluationOptions::default()).await;
    assert_eq!((second.succeeded, second.skipped), (0, 1));
    assert!(second.is_clean());

    let second_row = fetch_summary(&repo).await;
    assert_eq!(
        first_row.outcome(MetricKind::MaxNumberOfEventsPerTimeperiod, WindowKind::Day),
        second_row.outcome(MetricKind::MaxNumberOfEventsPerTimeperiod, WindowKind::Day)
    );
    assert_eq!(repo.summary_count(), 1);
}

#[tokio::test]
async fn test_no_dispatch_yields_zero_counts_and_null_sums() {
    let repo = LocalRepository::new();
    seed_contract(&repo);
    let mut program = base_program();
    program
        .max_number_of_events_per_timeperiod
        .insert(WindowKind::Day, json!(10));
    program
        .cumulative_event_duration
        .insert(WindowKind::Day, json!({"min": 30, "max": 240}));
    repo.seed_program(program);
    // No events at all.

    let report =
        run_daily_evaluation(&repo, eval_date(), &EvaluationOptions::default()).await;
    assert_eq!(report.succeeded, 1);

    let summary = fetch_summary(&repo).await;
    // A count over no rows is a real zero...
    let count = summary.outcome(MetricKind::MaxNumberOfEventsPerTimeperiod, WindowKind::Day);
    assert_eq!(count.value, Some(Decimal::ZERO));
    assert_eq!(count.violation, Some(false));
    // ...while a sum over no rows stays null and unevaluated.
    let minutes = summary.outcome(MetricKind::CumulativeEventDuration, WindowKind::Day);
    assert_eq!(minutes.value, None);
    assert_eq!(minutes.warning, Some(false));
}

#[tokio::test]
async fn test_unsupported_shape_aborts_contract_without_persisting() {
    let repo = LocalRepository::new();
    seed_contract(&repo);
    let mut program = base_program();
    program.opt_out_limits.insert(WindowKind::Day, json!("many"));
    repo.seed_program(program);

    let report =
        run_daily_evaluation(&repo, eval_date(), &EvaluationOptions::default()).await;
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].kind, "unsupported_constraint_shape");
    assert_eq!(repo.summary_count(), 0);
}

#[tokio::test]
async fn test_missing_program_start_date_skips_only_lifetime_window() {
    let repo = LocalRepository::new();
    seed_contract(&repo);
    let mut program = base_program();
    program.start_date = None;
    program.opt_out_limits.insert(WindowKind::Day, json!(5));
    program
        .opt_out_limits
        .insert(WindowKind::ProgramDuration, json!(50));
    repo.seed_program(program);

    let report =
        run_daily_evaluation(&repo, eval_date(), &EvaluationOptions::default()).await;
    assert_eq!(report.succeeded, 1);

    let summary = fetch_summary(&repo).await;
    assert!(summary
        .outcome(MetricKind::OptOuts, WindowKind::Day)
        .is_configured());
    assert!(!summary
        .outcome(MetricKind::OptOuts, WindowKind::ProgramDuration)
        .is_configured());
}

#[tokio::test]
async fn test_missing_program_fails_only_that_contract() {
    let repo = LocalRepository::new();
    seed_contract(&repo);
    repo.seed_contract(Contract {
        contract_id: ContractId(2),
        program_id: ProgramId(8),
        status: ContractStatus::Active,
    });
    // Only contract 2's program exists.
    let mut program = ProgramConfig::empty(ProgramId(8));
    program.max_number_of_events_per_timeperiod
        .insert(WindowKind::Day, json!(10));
    repo.seed_program(program);

    let report =
        run_daily_evaluation(&repo, eval_date(), &EvaluationOptions::default()).await;
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].contract_id, ContractId(1));
    assert_eq!(report.failures[0].kind, "aggregation_query_failure");
}

// ==================== Misbehaving aggregation backends ====================

/// Wraps the local repository and degrades its aggregate queries: delays
/// them so the service's deadline fires, or drops the last result so the
/// vector comes back short.
#[derive(Clone)]
struct FaultyAggregateRepository {
    inner: LocalRepository,
    delay: Duration,
    drop_last_result: bool,
}

impl FaultyAggregateRepository {
    fn new(inner: LocalRepository) -> Self {
        Self {
            inner,
            delay: Duration::ZERO,
            drop_last_result: false,
        }
    }
}

#[async_trait]
impl ContractRepository for FaultyAggregateRepository {
    async fn fetch_active_contracts(
        &self,
        offset: usize,
        limit: usize,
    ) -> RepositoryResult<Vec<Contract>> {
        self.inner.fetch_active_contracts(offset, limit).await
    }

    async fn contract_exists(&self, contract_id: ContractId) -> RepositoryResult<bool> {
        self.inner.contract_exists(contract_id).await
    }
}

#[async_trait]
impl ProgramRepository for FaultyAggregateRepository {
    async fn get_program(&self, program_id: ProgramId) -> RepositoryResult<ProgramConfig> {
        self.inner.get_program(program_id).await
    }
}

#[async_trait]
impl DispatchEventRepository for FaultyAggregateRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.inner.health_check().await
    }

    async fn insert_events(&self, events: &[DispatchEvent]) -> RepositoryResult<usize> {
        self.inner.insert_events(events).await
    }

    async fn insert_opt_out_responses(
        &self,
        responses: &[OptOutResponse],
    ) -> RepositoryResult<usize> {
        self.inner.insert_opt_out_responses(responses).await
    }

    async fn aggregate_events(
        &self,
        contract_id: ContractId,
        scope: EventScope,
        specs: &[AggregateSpec],
    ) -> RepositoryResult<Vec<Option<Decimal>>> {
        tokio::time::sleep(self.delay).await;
        let mut values = self.inner.aggregate_events(contract_id, scope, specs).await?;
        if self.drop_last_result {
            values.pop();
        }
        Ok(values)
    }
}

#[async_trait]
impl SummaryRepository for FaultyAggregateRepository {
    async fn insert_summary(&self, summary: &ConstraintSummary) -> RepositoryResult<()> {
        self.inner.insert_summary(summary).await
    }

    async fn get_summary(
        &self,
        contract_id: ContractId,
        day: NaiveDate,
    ) -> RepositoryResult<Option<ConstraintSummary>> {
        self.inner.get_summary(contract_id, day).await
    }

    async fn has_summary(
        &self,
        contract_id: ContractId,
        day: NaiveDate,
    ) -> RepositoryResult<bool> {
        self.inner.has_summary(contract_id, day).await
    }
}

#[tokio::test]
async fn test_aggregate_timeout_skips_contract_without_persisting() {
    let inner = LocalRepository::new();
    seed_contract(&inner);
    let mut program = base_program();
    program
        .max_number_of_events_per_timeperiod
        .insert(WindowKind::Day, json!(10));
    inner.seed_program(program);

    let repo = FaultyAggregateRepository {
        delay: Duration::from_millis(200),
        ..FaultyAggregateRepository::new(inner.clone())
    };
    let options = EvaluationOptions {
        aggregate_timeout: Duration::from_millis(10),
        ..EvaluationOptions::default()
    };

    let report = run_daily_evaluation(&repo, eval_date(), &options).await;
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].kind, "aggregation_timeout");
    assert_eq!(inner.summary_count(), 0);
}

#[tokio::test]
async fn test_short_aggregate_result_fails_contract_without_persisting() {
    let inner = LocalRepository::new();
    seed_contract(&inner);
    let mut program = base_program();
    program
        .max_number_of_events_per_timeperiod
        .insert(WindowKind::Day, json!(10));
    program
        .max_number_of_events_per_timeperiod
        .insert(WindowKind::Week, json!(50));
    inner.seed_program(program);

    // A backend answering with fewer results than specs must fail the
    // contract loudly instead of leaving constraints unevaluated.
    let repo = FaultyAggregateRepository {
        drop_last_result: true,
        ..FaultyAggregateRepository::new(inner.clone())
    };

    let report =
        run_daily_evaluation(&repo, eval_date(), &EvaluationOptions::default()).await;
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].kind, "aggregation_query_failure");
    assert_eq!(inner.summary_count(), 0);
}
