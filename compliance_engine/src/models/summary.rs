use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::contract::ContractId;
use super::metric::{MetricKind, SUMMARY_COLUMNS};
use super::window::WindowKind;
use crate::constraints::Constraint;

/// One `(value, warning, violation)` cell of a constraint summary.
///
/// All three fields are null for a (metric, window) pair the program does not
/// configure. A constraint whose aggregate produced no rows keeps a null
/// value with evaluated (false) flags; "no dispatch happened" for a count is
/// a real `0`, never null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintOutcome {
    pub value: Option<Decimal>,
    pub warning: Option<bool>,
    pub violation: Option<bool>,
}

impl ConstraintOutcome {
    pub fn is_configured(&self) -> bool {
        self.warning.is_some() || self.violation.is_some()
    }
}

/// Persisted compliance snapshot for one contract on one evaluation day.
///
/// Unique on `(contract_id, day)`; created once per evaluation day and never
/// mutated afterwards. Internally a fixed table over the full
/// (metric, window) catalog; the wide per-column row shape only materializes
/// at the storage boundary via [`ConstraintSummary::columns`].
#[derive(Debug, Clone)]
pub struct ConstraintSummary {
    pub contract_id: ContractId,
    pub day: NaiveDate,
    entries: BTreeMap<(MetricKind, WindowKind), ConstraintOutcome>,
}

impl ConstraintSummary {
    /// Fold a set of evaluated constraints into a summary row.
    ///
    /// Every catalog column starts null; columns addressed by a constraint's
    /// (metric, window) key are overwritten with its triple.
    pub fn build<'a>(
        contract_id: ContractId,
        day: NaiveDate,
        constraints: impl IntoIterator<Item = &'a Constraint>,
    ) -> Self {
        let mut entries: BTreeMap<(MetricKind, WindowKind), ConstraintOutcome> = SUMMARY_COLUMNS
            .iter()
            .map(|&key| (key, ConstraintOutcome::default()))
            .collect();

        for constraint in constraints {
            entries.insert(
                (constraint.metric, constraint.window),
                ConstraintOutcome {
                    value: constraint.value,
                    warning: Some(constraint.warning),
                    violation: Some(constraint.violation),
                },
            );
        }

        Self {
            contract_id,
            day,
            entries,
        }
    }

    /// Cell for one (metric, window) pair.
    pub fn outcome(&self, metric: MetricKind, window: WindowKind) -> &ConstraintOutcome {
        // The catalog is fixed at construction, so every key resolves.
        static NULL: ConstraintOutcome = ConstraintOutcome {
            value: None,
            warning: None,
            violation: None,
        };
        self.entries.get(&(metric, window)).unwrap_or(&NULL)
    }

    /// Iterate the wide row: one labelled column triple per catalog entry,
    /// in catalog order. This is the shape a SQL backend persists.
    pub fn columns(&self) -> impl Iterator<Item = (String, &ConstraintOutcome)> {
        SUMMARY_COLUMNS.iter().map(move |&(metric, window)| {
            (metric.label(window), self.outcome(metric, window))
        })
    }

    /// Nested `{metric: {window: {value, warning, violation}}}` view for
    /// reporting consumers, omitting any cell whose value is null.
    pub fn to_report_view(&self) -> serde_json::Value {
        let mut metrics = serde_json::Map::new();
        for metric in MetricKind::ALL {
            let mut windows = serde_json::Map::new();
            for window in WindowKind::ALL {
                let outcome = self.outcome(metric, window);
                if let Some(value) = outcome.value {
                    windows.insert(
                        window.as_str().to_string(),
                        json!({
                            "value": value,
                            "warning": outcome.warning,
                            "violation": outcome.violation,
                        }),
                    );
                }
            }
            if !windows.is_empty() {
                metrics.insert(metric.as_str().to_string(), serde_json::Value::Object(windows));
            }
        }
        serde_json::Value::Object(metrics)
    }
}
