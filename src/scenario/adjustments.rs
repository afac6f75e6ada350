use crate::core::flow::{FlowCategory, FlowDirection};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Comparison operator used by custom scenario rules and alert rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Lt,
    Gt,
    Eq,
    Lte,
    Gte,
}

impl CompareOp {
    /// Evaluate `left OP right` for ordered values.
    pub fn compare<T: PartialOrd>(&self, left: T, right: T) -> bool {
        match self {
            CompareOp::Lt => left < right,
            CompareOp::Gt => left > right,
            CompareOp::Eq => left == right,
            CompareOp::Lte => left <= right,
            CompareOp::Gte => left >= right,
        }
    }
}

/// The flow attribute a custom rule conditions on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleField {
    Category,
    Direction,
    Amount,
}

/// Condition value for a custom rule. Textual for category/direction
/// matches, numeric for amount comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Number(Decimal),
    Text(String),
}

/// What a matching custom rule does to a flow instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    /// Multiply the amount by a factor.
    Multiply(Decimal),
    /// Add a signed amount.
    Add(Decimal),
    /// Shift the flow date by signed days.
    DelayDays(i64),
}

/// An open-ended conditional adjustment: field/operator/value → action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRule {
    pub field: RuleField,
    pub op: CompareOp,
    pub value: RuleValue,
    pub action: RuleAction,
}

impl CustomRule {
    /// Whether this rule's condition holds for a flow instance.
    ///
    /// Category and direction only support equality; amount supports the
    /// full operator set. A type mismatch between field and value never
    /// matches.
    pub fn applies_to(
        &self,
        direction: FlowDirection,
        category: FlowCategory,
        amount: Decimal,
    ) -> bool {
        match (self.field, &self.value) {
            (RuleField::Category, RuleValue::Text(v)) => {
                self.op == CompareOp::Eq && category.to_string() == *v
            }
            (RuleField::Direction, RuleValue::Text(v)) => {
                let label = match direction {
                    FlowDirection::Inflow => "inflow",
                    FlowDirection::Outflow => "outflow",
                };
                self.op == CompareOp::Eq && label == v
            }
            (RuleField::Amount, RuleValue::Number(v)) => self.op.compare(amount, *v),
            _ => false,
        }
    }
}

/// A named, reusable set of adjustment parameters.
///
/// Scalar fields are optional: `None` means "not set", which matters for
/// [`ScenarioAdjustments::merge`] — merging B into A only overrides fields
/// B actually sets. Applying adjustments never mutates the flow set they
/// are given; the forecast engine derives new instances.
///
/// Sign conventions:
/// - `inflow_haircut_pct`: positive reduces inflows.
/// - `outflow_increase_pct`: positive increases outflows.
/// - `distribution_delay_days`: positive delays distribution inflows.
/// - `capital_call_shift_days`: signed days added to capital-call dates,
///   negative = earlier.
/// - `rate_shock_bps`: applied to debt-category outflows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAdjustments {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflow_haircut_pct: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outflow_increase_pct: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_delay_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_call_shift_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_shock_bps: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_rules: Vec<CustomRule>,
}

/// Result of validating a set of adjustments. Never thrown: callers decide
/// whether to proceed with an invalid scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ScenarioAdjustments {
    /// No-op adjustment set.
    pub fn none() -> Self {
        Self::default()
    }

    // Effective values with unset fields defaulting to zero.

    pub fn inflow_haircut(&self) -> Decimal {
        self.inflow_haircut_pct.unwrap_or(Decimal::ZERO)
    }

    pub fn outflow_increase(&self) -> Decimal {
        self.outflow_increase_pct.unwrap_or(Decimal::ZERO)
    }

    pub fn distribution_delay(&self) -> i64 {
        self.distribution_delay_days.unwrap_or(0)
    }

    pub fn capital_call_shift(&self) -> i64 {
        self.capital_call_shift_days.unwrap_or(0)
    }

    pub fn rate_shock(&self) -> Decimal {
        self.rate_shock_bps.unwrap_or(Decimal::ZERO)
    }

    /// Whether every field is zero/absent and no custom rules exist.
    pub fn is_noop(&self) -> bool {
        self.inflow_haircut() == Decimal::ZERO
            && self.outflow_increase() == Decimal::ZERO
            && self.distribution_delay() == 0
            && self.capital_call_shift() == 0
            && self.rate_shock() == Decimal::ZERO
            && self.custom_rules.is_empty()
    }

    /// Validate every scalar against its inclusive bounds.
    ///
    /// Bounds: inflow haircut [-100, 100]%, outflow increase [-100, 500]%,
    /// distribution delay [-365, 365] days, capital-call shift [-180, 180]
    /// days, rate shock [-500, 1000] bp.
    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();

        if let Some(v) = self.inflow_haircut_pct {
            if v < dec!(-100) || v > dec!(100) {
                errors.push(format!(
                    "inflow haircut must be between -100% and 100%, got {}%",
                    v
                ));
            }
        }
        if let Some(v) = self.outflow_increase_pct {
            if v < dec!(-100) || v > dec!(500) {
                errors.push(format!(
                    "outflow increase must be between -100% and 500%, got {}%",
                    v
                ));
            }
        }
        if let Some(v) = self.distribution_delay_days {
            if !(-365..=365).contains(&v) {
                errors.push(format!(
                    "distribution delay must be between -365 and 365 days, got {}",
                    v
                ));
            }
        }
        if let Some(v) = self.capital_call_shift_days {
            if !(-180..=180).contains(&v) {
                errors.push(format!(
                    "capital call shift must be between -180 and 180 days, got {}",
                    v
                ));
            }
        }
        if let Some(v) = self.rate_shock_bps {
            if v < dec!(-500) || v > dec!(1000) {
                errors.push(format!(
                    "rate shock must be between -500 and 1000 basis points, got {}",
                    v
                ));
            }
        }

        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Merge `overlay` into `self`, producing a new adjustment set.
    ///
    /// Scalars set in the overlay override; unset scalars keep the base
    /// value. Custom-rule lists concatenate, never replace wholesale.
    pub fn merge(&self, overlay: &ScenarioAdjustments) -> ScenarioAdjustments {
        let mut custom_rules = self.custom_rules.clone();
        custom_rules.extend(overlay.custom_rules.iter().cloned());

        ScenarioAdjustments {
            inflow_haircut_pct: overlay.inflow_haircut_pct.or(self.inflow_haircut_pct),
            outflow_increase_pct: overlay.outflow_increase_pct.or(self.outflow_increase_pct),
            distribution_delay_days: overlay
                .distribution_delay_days
                .or(self.distribution_delay_days),
            capital_call_shift_days: overlay
                .capital_call_shift_days
                .or(self.capital_call_shift_days),
            rate_shock_bps: overlay.rate_shock_bps.or(self.rate_shock_bps),
            custom_rules,
        }
    }

    /// Human-readable summary of the non-zero fields, comma-joined.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();

        let haircut = self.inflow_haircut();
        if haircut != Decimal::ZERO {
            if haircut > Decimal::ZERO {
                parts.push(format!("{}% inflow reduction", haircut));
            } else {
                parts.push(format!("{}% inflow increase", -haircut));
            }
        }
        let increase = self.outflow_increase();
        if increase != Decimal::ZERO {
            if increase > Decimal::ZERO {
                parts.push(format!("{}% outflow increase", increase));
            } else {
                parts.push(format!("{}% outflow reduction", -increase));
            }
        }
        let delay = self.distribution_delay();
        if delay != 0 {
            if delay > 0 {
                parts.push(format!("distributions delayed {} days", delay));
            } else {
                parts.push(format!("distributions {} days earlier", -delay));
            }
        }
        let shift = self.capital_call_shift();
        if shift != 0 {
            if shift < 0 {
                parts.push(format!("capital calls {} days earlier", -shift));
            } else {
                parts.push(format!("capital calls {} days later", shift));
            }
        }
        let shock = self.rate_shock();
        if shock != Decimal::ZERO {
            if shock > Decimal::ZERO {
                parts.push(format!("+{}bp rate shock", shock));
            } else {
                parts.push(format!("{}bp rate shock", shock));
            }
        }
        if !self.custom_rules.is_empty() {
            parts.push(format!("{} custom rule(s)", self.custom_rules.len()));
        }

        if parts.is_empty() {
            "no adjustments".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// A named, reusable scenario owned by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashScenario {
    pub name: String,
    pub adjustments: ScenarioAdjustments,
    pub is_default: bool,
}

impl CashScenario {
    pub fn new(name: impl Into<String>, adjustments: ScenarioAdjustments) -> Self {
        Self {
            name: name.into(),
            adjustments,
            is_default: false,
        }
    }

    /// The no-op baseline scenario.
    pub fn base() -> Self {
        Self {
            name: "base".into(),
            adjustments: ScenarioAdjustments::none(),
            is_default: true,
        }
    }

    /// Conservative preset: reduced and delayed inflows, larger and earlier
    /// outflows, higher rates.
    pub fn conservative() -> Self {
        Self::new(
            "conservative",
            ScenarioAdjustments {
                inflow_haircut_pct: Some(dec!(15)),
                outflow_increase_pct: Some(dec!(10)),
                distribution_delay_days: Some(30),
                capital_call_shift_days: Some(-14),
                rate_shock_bps: Some(dec!(50)),
                custom_rules: Vec::new(),
            },
        )
    }

    /// Aggressive preset: the conservative preset with every sign mirrored.
    pub fn aggressive() -> Self {
        Self::new(
            "aggressive",
            ScenarioAdjustments {
                inflow_haircut_pct: Some(dec!(-15)),
                outflow_increase_pct: Some(dec!(-10)),
                distribution_delay_days: Some(-30),
                capital_call_shift_days: Some(14),
                rate_shock_bps: Some(dec!(-50)),
                custom_rules: Vec::new(),
            },
        )
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "base" => Some(Self::base()),
            "conservative" => Some(Self::conservative()),
            "aggressive" => Some(Self::aggressive()),
            _ => None,
        }
    }
}
