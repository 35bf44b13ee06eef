use serde::{Deserialize, Serialize};

/// Rolling aggregation window for constraint evaluation.
///
/// Each window is anchored at a start timestamp computed for the evaluation
/// date (see [`crate::time::window_start`]); "value for window X" means
/// "aggregate over qualifying events with `start_time >= anchor`".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowKind {
    Day,
    Week,
    Month,
    Year,
    ProgramDuration,
}

impl WindowKind {
    /// All windows, in catalog order.
    pub const ALL: [WindowKind; 5] = [
        WindowKind::Day,
        WindowKind::Week,
        WindowKind::Month,
        WindowKind::Year,
        WindowKind::ProgramDuration,
    ];

    /// Lower-case name, used as the window half of summary column labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowKind::Day => "day",
            WindowKind::Week => "week",
            WindowKind::Month => "month",
            WindowKind::Year => "year",
            WindowKind::ProgramDuration => "program_duration",
        }
    }
}

impl std::fmt::Display for WindowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
