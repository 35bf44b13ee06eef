use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::window::WindowKind;

/// Metric families tracked by the constraint summary.
///
/// Together with [`WindowKind`] this forms the strongly typed key that
/// replaces the `"{metric}_{window}"` string convention; labels are only
/// rendered at serialization boundaries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Total dispatched minutes over a window (bounded-range limits).
    CumulativeEventDuration,
    /// Count of dispatched events over a window (single threshold).
    MaxNumberOfEventsPerTimeperiod,
    /// Count of opted-out events over a window (single threshold).
    OptOuts,
    /// Total dispatched energy over a window (single threshold, demand
    /// management programs only).
    MaxTotalEnergyPerTimeperiod,
}

impl MetricKind {
    /// All metric families, in catalog order.
    pub const ALL: [MetricKind; 4] = [
        MetricKind::CumulativeEventDuration,
        MetricKind::MaxNumberOfEventsPerTimeperiod,
        MetricKind::OptOuts,
        MetricKind::MaxTotalEnergyPerTimeperiod,
    ];

    /// Lower-case name, used as the metric half of summary column labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::CumulativeEventDuration => "cumulative_event_duration",
            MetricKind::MaxNumberOfEventsPerTimeperiod => "max_number_of_events_per_timeperiod",
            MetricKind::OptOuts => "opt_outs",
            MetricKind::MaxTotalEnergyPerTimeperiod => "max_total_energy_per_timeperiod",
        }
    }

    /// Render the flat `"{metric}_{window}"` label for a column.
    pub fn label(&self, window: WindowKind) -> String {
        format!("{}_{}", self.as_str(), window.as_str())
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The full (metric, window) column catalog of a constraint summary.
///
/// Every summary row carries a `(value, warning, violation)` triple for each
/// of these pairs; pairs not configured for a program stay null.
pub static SUMMARY_COLUMNS: Lazy<Vec<(MetricKind, WindowKind)>> = Lazy::new(|| {
    let mut columns = Vec::with_capacity(MetricKind::ALL.len() * WindowKind::ALL.len());
    for metric in MetricKind::ALL {
        for window in WindowKind::ALL {
            columns.push((metric, window));
        }
    }
    columns
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_labels() {
        assert_eq!(
            MetricKind::CumulativeEventDuration.label(WindowKind::Week),
            "cumulative_event_duration_week"
        );
        assert_eq!(
            MetricKind::MaxNumberOfEventsPerTimeperiod.label(WindowKind::Day),
            "max_number_of_events_per_timeperiod_day"
        );
        assert_eq!(
            MetricKind::OptOuts.label(WindowKind::ProgramDuration),
            "opt_outs_program_duration"
        );
    }

    #[test]
    fn test_summary_column_catalog() {
        assert_eq!(SUMMARY_COLUMNS.len(), 20);
        assert!(SUMMARY_COLUMNS.contains(&(
            MetricKind::MaxTotalEnergyPerTimeperiod,
            WindowKind::Year
        )));
    }
}
