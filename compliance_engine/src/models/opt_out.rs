use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::contract::DerId;

/// A DER's response to a dispatch instruction, correlated to dispatch events
/// by `control_id`.
///
/// A dispatch event counts toward "dispatched" aggregates only if no
/// correlated response has `is_opt_out = true`; it counts toward "opted-out"
/// aggregates only if one does. An event with no response row at all counts
/// as dispatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptOutResponse {
    pub control_id: String,
    pub der_id: DerId,
    pub is_opt_out: bool,
    pub response_time: DateTime<Utc>,
}
