use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::contract::ContractId;

/// A day-bounded dispatch event as persisted in the store.
///
/// Invariant: `start_time < end_time`, and the half-open interval
/// `[start_time, end_time)` never spans more than one calendar day. The
/// normalizer enforces this before persistence by splitting raw
/// instructions at midnight boundaries.
///
/// `cumulative_duration_minutes`, `total_energy` and `command_value` are
/// time-weighted shares of the originating instruction, so summing them over
/// all events of one instruction reproduces its single-interval totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchEvent {
    pub event_id: String,
    pub contract_id: ContractId,
    /// Correlates this event to opt-out responses for the same control
    /// instruction.
    pub control_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub command_value: Decimal,
    pub cumulative_duration_minutes: Decimal,
    pub total_energy: Decimal,
    pub status: String,
    pub control_type: String,
}

/// A raw dispatch instruction as delivered by the upstream ingestion feed,
/// one per accepted control action. May straddle a calendar-day boundary;
/// the normalizer is its sole consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDispatchInstruction {
    pub event_id: String,
    pub contract_id: ContractId,
    pub control_id: String,
    /// Epoch seconds, UTC.
    pub start_time: i64,
    /// Epoch seconds, UTC.
    pub end_time: i64,
    /// Decimal string in the wire format, e.g. `"1.25"`.
    pub command_value: Decimal,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub control_type: String,
}
