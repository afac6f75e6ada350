use crate::alert::alert::AlertSeverity;
use crate::scenario::adjustments::CompareOp;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// The derived forecast scalar a rule compares against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertMetric {
    /// Days from the horizon start to the first deficit day.
    DaysUntilDeficit,
    /// Minimum closing balance over the horizon.
    MinimumBalance,
    /// How far the minimum fell below the threshold (never negative).
    ShortfallAmount,
    /// Number of deficit days in the horizon.
    DeficitDayCount,
}

/// One alert rule: `metric OP threshold → severity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    pub name: String,
    pub metric: AlertMetric,
    pub op: CompareOp,
    pub threshold: Decimal,
    pub severity: AlertSeverity,
    pub enabled: bool,
}

impl AlertRule {
    pub fn new(
        name: impl Into<String>,
        metric: AlertMetric,
        op: CompareOp,
        threshold: Decimal,
        severity: AlertSeverity,
    ) -> Self {
        Self {
            name: name.into(),
            metric,
            op,
            threshold,
            severity,
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether this rule fires for a metric value.
    pub fn matches(&self, value: Decimal) -> bool {
        self.enabled && self.op.compare(value, self.threshold)
    }
}

/// The built-in rule set.
///
/// Returned fresh on each call and never mutated at runtime; callers
/// needing custom behavior pass their own rule slice instead of patching
/// shared state. Thresholds are currency-unit-agnostic at this layer.
pub fn default_rules() -> Vec<AlertRule> {
    vec![
        AlertRule::new(
            "imminent-deficit",
            AlertMetric::DaysUntilDeficit,
            CompareOp::Lte,
            dec!(30),
            AlertSeverity::Critical,
        ),
        AlertRule::new(
            "approaching-deficit",
            AlertMetric::DaysUntilDeficit,
            CompareOp::Lte,
            dec!(90),
            AlertSeverity::Warning,
        ),
        AlertRule::new(
            "low-minimum-balance",
            AlertMetric::MinimumBalance,
            CompareOp::Lt,
            dec!(100_000),
            AlertSeverity::Warning,
        ),
        AlertRule::new(
            "any-shortfall",
            AlertMetric::ShortfallAmount,
            CompareOp::Gt,
            Decimal::ZERO,
            AlertSeverity::Info,
        ),
    ]
}
