use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::contract::ProgramId;
use super::window::WindowKind;

/// Demand-management limit: at most one total-energy threshold per program,
/// bound to a single window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandManagement {
    /// Raw limit value as stored by program management; parsed into a
    /// constraint shape at build time.
    pub max_total_energy_per_timeperiod: serde_json::Value,
    pub window: WindowKind,
}

/// A program's dispatch-constraint configuration, read from the program
/// store by `program_id`.
///
/// Limit values are kept in the raw program-store representation
/// (`serde_json::Value`); the constraint builder parses them into tagged
/// shapes and rejects anything that is neither a plain number nor a min/max
/// pair. Window maps may cover any subset of the five windows; metrics with
/// no configuration at all produce no constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramConfig {
    pub program_id: ProgramId,

    /// Anchor for the PROGRAM_DURATION window. Programs without a start date
    /// skip lifetime constraints.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Bounded range (min/max minutes) for a single event's duration.
    /// Informational only; not evaluated per window by this engine.
    #[serde(default)]
    pub event_duration_constraint: Option<serde_json::Value>,

    /// Bounded range (min/max minutes) of total dispatch time, per window.
    #[serde(default)]
    pub cumulative_event_duration: BTreeMap<WindowKind, serde_json::Value>,

    /// Single integer threshold on dispatched-event counts, per window.
    #[serde(default)]
    pub max_number_of_events_per_timeperiod: BTreeMap<WindowKind, serde_json::Value>,

    /// Optional demand-management energy limit.
    #[serde(default)]
    pub demand_management: Option<DemandManagement>,

    /// Integer threshold on opt-out counts, per window.
    #[serde(default)]
    pub opt_out_limits: BTreeMap<WindowKind, serde_json::Value>,
}

impl ProgramConfig {
    /// A configuration with no limits at all, useful as a test fixture base.
    pub fn empty(program_id: ProgramId) -> Self {
        Self {
            program_id,
            start_date: None,
            event_duration_constraint: None,
            cumulative_event_duration: BTreeMap::new(),
            max_number_of_events_per_timeperiod: BTreeMap::new(),
            demand_management: None,
            opt_out_limits: BTreeMap::new(),
        }
    }
}
