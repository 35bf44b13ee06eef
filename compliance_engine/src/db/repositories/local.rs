//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMap and Vec structures, providing fast, deterministic,
//! and isolated execution.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::constraints::{AggregateQuantity, EventScope};
use crate::db::repository::*;
use crate::models::{
    ConstraintSummary, Contract, ContractId, DispatchEvent, OptOutResponse, ProgramConfig,
    ProgramId,
};

/// In-memory local repository.
///
/// Ideal for unit tests and local development that need isolation and speed.
/// Seed it with [`LocalRepository::seed_contract`] and
/// [`LocalRepository::seed_program`], insert events through the normal trait
/// methods, and drive the evaluation service against it.
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    contracts: HashMap<ContractId, Contract>,
    programs: HashMap<ProgramId, ProgramConfig>,
    events: Vec<DispatchEvent>,
    opt_out_responses: Vec<OptOutResponse>,
    summaries: HashMap<(ContractId, NaiveDate), ConstraintSummary>,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            contracts: HashMap::new(),
            programs: HashMap::new(),
            events: Vec::new(),
            opt_out_responses: Vec::new(),
            summaries: HashMap::new(),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contract to the repository.
    pub fn seed_contract(&self, contract: Contract) {
        let mut data = self.data.write();
        data.contracts.insert(contract.contract_id, contract);
    }

    /// Add a program configuration to the repository.
    pub fn seed_program(&self, program: ProgramConfig) {
        let mut data = self.data.write();
        data.programs.insert(program.program_id, program);
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let healthy = data.is_healthy;
        *data = LocalData {
            is_healthy: healthy,
            ..Default::default()
        };
    }

    /// Number of dispatch events stored.
    pub fn event_count(&self) -> usize {
        self.data.read().events.len()
    }

    /// Number of summaries stored.
    pub fn summary_count(&self) -> usize {
        self.data.read().summaries.len()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::ConnectionError(
                "Database is not healthy".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ContractRepository for LocalRepository {
    async fn fetch_active_contracts(
        &self,
        offset: usize,
        limit: usize,
    ) -> RepositoryResult<Vec<Contract>> {
        self.check_health()?;
        let data = self.data.read();
        let mut active: Vec<Contract> = data
            .contracts
            .values()
            .filter(|c| c.is_active())
            .cloned()
            .collect();
        active.sort_by_key(|c| c.contract_id);
        Ok(active.into_iter().skip(offset).take(limit).collect())
    }

    async fn contract_exists(&self, contract_id: ContractId) -> RepositoryResult<bool> {
        self.check_health()?;
        Ok(self.data.read().contracts.contains_key(&contract_id))
    }
}

#[async_trait]
impl ProgramRepository for LocalRepository {
    async fn get_program(&self, program_id: ProgramId) -> RepositoryResult<ProgramConfig> {
        self.check_health()?;
        self.data
            .read()
            .programs
            .get(&program_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::NotFound(format!("Program {} not found", program_id))
            })
    }
}

#[async_trait]
impl DispatchEventRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn insert_events(&self, events: &[DispatchEvent]) -> RepositoryResult<usize> {
        self.check_health()?;
        let mut data = self.data.write();
        data.events.extend_from_slice(events);
        Ok(events.len())
    }

    async fn insert_opt_out_responses(
        &self,
        responses: &[OptOutResponse],
    ) -> RepositoryResult<usize> {
        self.check_health()?;
        let mut data = self.data.write();
        data.opt_out_responses.extend_from_slice(responses);
        Ok(responses.len())
    }

    async fn aggregate_events(
        &self,
        contract_id: ContractId,
        scope: EventScope,
        specs: &[AggregateSpec],
    ) -> RepositoryResult<Vec<Option<Decimal>>> {
        self.check_health()?;
        let data = self.data.read();

        // Control ids with at least one is_opt_out response; everything else
        // counts as dispatched.
        let opted_out: HashSet<&str> = data
            .opt_out_responses
            .iter()
            .filter(|r| r.is_opt_out)
            .map(|r| r.control_id.as_str())
            .collect();

        let results = specs
            .iter()
            .map(|spec| {
                let mut sum = Decimal::ZERO;
                let mut rows = 0usize;
                for event in data
                    .events
                    .iter()
                    .filter(|e| e.contract_id == contract_id)
                    .filter(|e| e.start_time >= spec.window_start)
                    .filter(|e| match scope {
                        EventScope::DispatchedOnly => !opted_out.contains(e.control_id.as_str()),
                        EventScope::OptedOutOnly => opted_out.contains(e.control_id.as_str()),
                    })
                {
                    rows += 1;
                    sum += match spec.quantity {
                        AggregateQuantity::DurationMinutes => event.cumulative_duration_minutes,
                        AggregateQuantity::TotalEnergy => event.total_energy,
                        AggregateQuantity::EventCount => Decimal::ONE,
                    };
                }
                match spec.quantity {
                    // COUNT(*) over zero rows is still 0.
                    AggregateQuantity::EventCount => Some(sum),
                    // SUM over zero rows is NULL.
                    _ if rows == 0 => None,
                    _ => Some(sum),
                }
            })
            .collect();
        Ok(results)
    }
}

#[async_trait]
impl SummaryRepository for LocalRepository {
    async fn insert_summary(&self, summary: &ConstraintSummary) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        let key = (summary.contract_id, summary.day);
        if data.summaries.contains_key(&key) {
            return Err(RepositoryError::DuplicateKey(format!(
                "Constraint summary for contract {} on {} already exists",
                summary.contract_id, summary.day
            )));
        }
        data.summaries.insert(key, summary.clone());
        Ok(())
    }

    async fn get_summary(
        &self,
        contract_id: ContractId,
        day: NaiveDate,
    ) -> RepositoryResult<Option<ConstraintSummary>> {
        self.check_health()?;
        Ok(self.data.read().summaries.get(&(contract_id, day)).cloned())
    }

    async fn has_summary(
        &self,
        contract_id: ContractId,
        day: NaiveDate,
    ) -> RepositoryResult<bool> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .summaries
            .contains_key(&(contract_id, day)))
    }
}
