//! Constraint shapes and the two-tier warning/violation evaluation model.
//!
//! Programs express limits in two shapes: a single numeric threshold or a
//! bounded min/max range. Both share one evaluation contract: a `violation`
//! marks an actual breach, a `warning` marks approach to the limit (75% of
//! it). The shape is a tagged enum; the program store's raw JSON
//! representation is parsed once, at constraint-build time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{MetricKind, WindowKind};

/// Warning fires at 75% of the configured limit.
const WARNING_RATIO: Decimal = Decimal::from_parts(75, 0, 0, false, 2);

/// A configured limit in one of the two supported shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstraintShape {
    /// Single numeric threshold, compared by absolute magnitude so negative
    /// thresholds still bound magnitude correctly.
    Threshold(Decimal),
    /// Bounded range. Either bound may be absent; a range with neither bound
    /// is accepted but inert.
    Range {
        min: Option<Decimal>,
        max: Option<Decimal>,
    },
}

impl ConstraintShape {
    /// Parse the raw program-store representation: a JSON number becomes a
    /// threshold, an object with only `min`/`max` number members becomes a
    /// range. Anything else is unsupported.
    pub fn parse(raw: &serde_json::Value) -> Option<Self> {
        if let Some(threshold) = decimal_from_json(raw) {
            return Some(ConstraintShape::Threshold(threshold));
        }

        let object = raw.as_object()?;
        if !object.keys().all(|k| k == "min" || k == "max") {
            return None;
        }
        let mut bound = |key: &str| -> Option<Option<Decimal>> {
            match object.get(key) {
                None | Some(serde_json::Value::Null) => Some(None),
                Some(value) => decimal_from_json(value).map(Some),
            }
        };
        Some(ConstraintShape::Range {
            min: bound("min")?,
            max: bound("max")?,
        })
    }

    /// Evaluate a value against this shape, returning `(warning, violation)`.
    ///
    /// An unset value yields `(false, false)`: "not yet evaluated" is not
    /// the same as "compliant", and the summary keeps the null to show it.
    pub fn evaluate(&self, value: Option<Decimal>) -> (bool, bool) {
        let Some(value) = value else {
            return (false, false);
        };

        match self {
            ConstraintShape::Threshold(threshold) => {
                let magnitude = value.abs();
                let limit = threshold.abs();
                let violation = magnitude > limit;
                let warning = if limit.is_zero() {
                    !magnitude.is_zero()
                } else {
                    magnitude / limit >= WARNING_RATIO
                };
                (warning, violation)
            }
            ConstraintShape::Range { min, max } => {
                let below_min = min.map_or(false, |m| value < m);
                let above_max = max.map_or(false, |m| value > m);
                let near_max = max.map_or(false, |m| {
                    if m.is_zero() {
                        value >= m
                    } else {
                        value / m >= WARNING_RATIO
                    }
                });
                (below_min || near_max, below_min || above_max)
            }
        }
    }
}

fn decimal_from_json(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(_) => serde_json::from_value(value.clone()).ok(),
        _ => None,
    }
}

/// What an aggregate query computes for a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateQuantity {
    /// Sum of `cumulative_duration_minutes`.
    DurationMinutes,
    /// Sum of `total_energy`.
    TotalEnergy,
    /// Row count.
    EventCount,
}

/// Event-level predicate a constraint's aggregate is conditioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventScope {
    /// Events with no correlated opt-out response (or no response at all).
    DispatchedOnly,
    /// Events with a correlated `is_opt_out = true` response.
    OptedOutOnly,
}

/// One (metric, window) constraint instance for a single evaluation run.
///
/// Created by the builder, filled by the aggregation repository, folded into
/// a [`crate::models::ConstraintSummary`] and discarded — never persisted
/// individually.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub metric: MetricKind,
    pub window: WindowKind,
    pub window_start: DateTime<Utc>,
    pub shape: ConstraintShape,
    pub quantity: AggregateQuantity,
    pub value: Option<Decimal>,
    pub warning: bool,
    pub violation: bool,
}

impl Constraint {
    pub fn new(
        metric: MetricKind,
        window: WindowKind,
        window_start: DateTime<Utc>,
        shape: ConstraintShape,
    ) -> Self {
        let quantity = match metric {
            MetricKind::CumulativeEventDuration => AggregateQuantity::DurationMinutes,
            MetricKind::MaxTotalEnergyPerTimeperiod => AggregateQuantity::TotalEnergy,
            MetricKind::MaxNumberOfEventsPerTimeperiod | MetricKind::OptOuts => {
                AggregateQuantity::EventCount
            }
        };
        Self {
            metric,
            window,
            window_start,
            shape,
            quantity,
            value: None,
            warning: false,
            violation: false,
        }
    }

    /// Flat `"{metric}_{window}"` label for logs and reports.
    pub fn label(&self) -> String {
        self.metric.label(self.window)
    }

    /// Inject the aggregate result and evaluate the limit.
    pub fn set_value(&mut self, value: Option<Decimal>) {
        self.value = value;
        let (warning, violation) = self.shape.evaluate(value);
        self.warning = warning;
        self.violation = violation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn test_parse_number_is_threshold() {
        let shape = ConstraintShape::parse(&json!(10)).unwrap();
        assert_eq!(shape, ConstraintShape::Threshold(dec(10)));

        let shape = ConstraintShape::parse(&json!(2.5)).unwrap();
        assert_eq!(
            shape,
            ConstraintShape::Threshold(Decimal::try_from(2.5f64).unwrap())
        );
    }

    #[test]
    fn test_parse_min_max_is_range() {
        let shape = ConstraintShape::parse(&json!({"min": 1, "max": 240})).unwrap();
        assert_eq!(
            shape,
            ConstraintShape::Range {
                min: Some(dec(1)),
                max: Some(dec(240)),
            }
        );

        let shape = ConstraintShape::parse(&json!({"max": 240})).unwrap();
        assert_eq!(
            shape,
            ConstraintShape::Range {
                min: None,
                max: Some(dec(240)),
            }
        );
    }

    #[test]
    fn test_parse_empty_range_is_accepted() {
        let shape = ConstraintShape::parse(&json!({})).unwrap();
        assert_eq!(shape, ConstraintShape::Range { min: None, max: None });
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(ConstraintShape::parse(&json!("10")).is_none());
        assert!(ConstraintShape::parse(&json!([10])).is_none());
        assert!(ConstraintShape::parse(&json!({"limit": 10})).is_none());
        assert!(ConstraintShape::parse(&json!({"min": "1"})).is_none());
        assert!(ConstraintShape::parse(&json!(null)).is_none());
    }

    #[test]
    fn test_threshold_violation_and_warning() {
        let shape = ConstraintShape::Threshold(dec(10));
        assert_eq!(shape.evaluate(Some(dec(11))), (true, true));
        assert_eq!(shape.evaluate(Some(dec(10))), (true, false)); // exactly at limit
        assert_eq!(shape.evaluate(Some(dec(7))), (false, false)); // 0.7 < 0.75
        assert_eq!(
            shape.evaluate(Some(Decimal::new(75, 1))),
            (true, false) // 7.5 / 10 == 0.75
        );
    }

    #[test]
    fn test_threshold_symmetry_for_negative_limits() {
        // A negative threshold bounds magnitude exactly like its positive twin.
        let positive = ConstraintShape::Threshold(dec(10));
        let negative = ConstraintShape::Threshold(dec(-10));
        for v in [-20i64, -8, 0, 8, 20] {
            assert_eq!(
                positive.evaluate(Some(dec(v))),
                negative.evaluate(Some(dec(v))),
                "value {v}"
            );
        }
    }

    #[test]
    fn test_threshold_unset_value_is_unevaluated() {
        let shape = ConstraintShape::Threshold(dec(10));
        assert_eq!(shape.evaluate(None), (false, false));
    }

    #[test]
    fn test_range_bounds() {
        let shape = ConstraintShape::Range {
            min: Some(dec(30)),
            max: Some(dec(100)),
        };
        assert_eq!(shape.evaluate(Some(dec(10))), (true, true)); // below min
        assert_eq!(shape.evaluate(Some(dec(50))), (false, false));
        assert_eq!(shape.evaluate(Some(dec(80))), (true, false)); // 0.8 of max
        assert_eq!(shape.evaluate(Some(dec(101))), (true, true)); // above max
    }

    #[test]
    fn test_range_without_bounds_is_inert() {
        let shape = ConstraintShape::Range { min: None, max: None };
        for v in [-100i64, 0, 100] {
            assert_eq!(shape.evaluate(Some(dec(v))), (false, false), "value {v}");
        }
    }

    #[test]
    fn test_count_constraint_quantity_mapping() {
        let at = chrono::Utc::now();
        let c = Constraint::new(
            MetricKind::OptOuts,
            WindowKind::Day,
            at,
            ConstraintShape::Threshold(dec(5)),
        );
        assert_eq!(c.quantity, AggregateQuantity::EventCount);

        let c = Constraint::new(
            MetricKind::MaxTotalEnergyPerTimeperiod,
            WindowKind::Week,
            at,
            ConstraintShape::Threshold(dec(600)),
        );
        assert_eq!(c.quantity, AggregateQuantity::TotalEnergy);
    }

    #[test]
    fn test_set_value_evaluates() {
        let mut c = Constraint::new(
            MetricKind::MaxNumberOfEventsPerTimeperiod,
            WindowKind::Day,
            chrono::Utc::now(),
            ConstraintShape::Threshold(dec(10)),
        );
        assert!(!c.violation);
        c.set_value(Some(dec(23)));
        assert_eq!(c.value, Some(dec(23)));
        assert!(c.warning);
        assert!(c.violation);
    }
}
