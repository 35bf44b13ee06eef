//! Builds the applicable constraint set for a program on an evaluation date.
//!
//! Constraints are partitioned into three groups by the event-level
//! predicate their aggregate query needs, so the repository can serve each
//! group with one grouped pass over the contract's events.

use chrono::NaiveDate;
use log::warn;

use crate::error::{EngineError, EngineResult};
use crate::models::{MetricKind, ProgramConfig, WindowKind};
use crate::time::window_start;

use super::model::{Constraint, ConstraintShape};

/// The full set of constraints applicable to one program, routed by
/// aggregation group.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    /// Dispatched-only sums: cumulative duration per window, plus the demand
    /// energy limit if the program defines one.
    pub dispatched_sums: Vec<Constraint>,
    /// Dispatched-only counts: max-events-per-window thresholds.
    pub dispatched_counts: Vec<Constraint>,
    /// Opted-out-only counts: opt-out limits per window.
    pub opted_out_counts: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn len(&self) -> usize {
        self.dispatched_sums.len() + self.dispatched_counts.len() + self.opted_out_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All constraints across the three groups.
    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.dispatched_sums
            .iter()
            .chain(self.dispatched_counts.iter())
            .chain(self.opted_out_counts.iter())
    }
}

/// Instantiate every constraint the program configures, anchored for the
/// evaluation date.
///
/// Metrics with no configuration produce no constraints (the summary keeps
/// their columns null). A PROGRAM_DURATION constraint on a program without a
/// start date is skipped with a warning; a limit value in an unsupported
/// shape aborts with [`EngineError::UnsupportedConstraintShape`], and the
/// caller must not persist anything for the contract.
pub fn build_constraints(
    evaluation_date: NaiveDate,
    program: &ProgramConfig,
) -> EngineResult<ConstraintSet> {
    let mut set = ConstraintSet::default();

    for (&window, raw) in &program.cumulative_event_duration {
        if let Some(c) = make_constraint(
            MetricKind::CumulativeEventDuration,
            window,
            raw,
            evaluation_date,
            program,
        )? {
            set.dispatched_sums.push(c);
        }
    }

    if let Some(demand) = &program.demand_management {
        if let Some(c) = make_constraint(
            MetricKind::MaxTotalEnergyPerTimeperiod,
            demand.window,
            &demand.max_total_energy_per_timeperiod,
            evaluation_date,
            program,
        )? {
            set.dispatched_sums.push(c);
        }
    }

    for (&window, raw) in &program.max_number_of_events_per_timeperiod {
        if let Some(c) = make_constraint(
            MetricKind::MaxNumberOfEventsPerTimeperiod,
            window,
            raw,
            evaluation_date,
            program,
        )? {
            set.dispatched_counts.push(c);
        }
    }

    for (&window, raw) in &program.opt_out_limits {
        if let Some(c) = make_constraint(
            MetricKind::OptOuts,
            window,
            raw,
            evaluation_date,
            program,
        )? {
            set.opted_out_counts.push(c);
        }
    }

    Ok(set)
}

/// Build one constraint, or `None` when its window cannot be anchored.
fn make_constraint(
    metric: MetricKind,
    window: WindowKind,
    raw: &serde_json::Value,
    evaluation_date: NaiveDate,
    program: &ProgramConfig,
) -> EngineResult<Option<Constraint>> {
    let shape = ConstraintShape::parse(raw).ok_or_else(|| {
        EngineError::UnsupportedConstraintShape {
            metric,
            window,
            raw: raw.to_string(),
        }
    })?;

    let start = match window_start(window, evaluation_date, program.start_date) {
        Ok(start) => start,
        Err(EngineError::MissingProgramStartDate) => {
            warn!(
                "program {}: skipping {} constraint, program has no start date",
                program.program_id,
                metric.label(window)
            );
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    Ok(Some(Constraint::new(metric, window, start, shape)))
}
