use crate::scenario::adjustments::ScenarioAdjustments;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named stress archetypes. Each maps to exactly one scenario adjustment
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressArchetype {
    /// Haircuts every inflow.
    MarketDrawdown,
    /// Pushes distribution inflows later.
    DelayedDistributions,
    /// Inflates every outflow.
    TaxSpike,
    /// Rate shock on debt-category outflows.
    DebtRateShock,
    /// Pulls capital-call outflows earlier.
    CapitalCallAcceleration,
}

impl StressArchetype {
    pub fn all() -> [StressArchetype; 5] {
        [
            StressArchetype::MarketDrawdown,
            StressArchetype::DelayedDistributions,
            StressArchetype::TaxSpike,
            StressArchetype::DebtRateShock,
            StressArchetype::CapitalCallAcceleration,
        ]
    }

    /// Parse a CLI/API label.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "market_drawdown" => Some(StressArchetype::MarketDrawdown),
            "delayed_distributions" => Some(StressArchetype::DelayedDistributions),
            "tax_spike" => Some(StressArchetype::TaxSpike),
            "debt_rate_shock" => Some(StressArchetype::DebtRateShock),
            "capital_call_acceleration" => Some(StressArchetype::CapitalCallAcceleration),
            _ => None,
        }
    }

    /// Default magnitude for a severity tier, in the archetype's own unit
    /// (percent, days, or basis points). Day-valued magnitudes carry the
    /// scenario sign convention: capital-call acceleration is negative
    /// (earlier).
    pub fn default_magnitude(&self, severity: StressSeverity) -> Decimal {
        use StressSeverity::*;
        match self {
            StressArchetype::MarketDrawdown => match severity {
                Mild => dec!(10),
                Moderate => dec!(25),
                Severe => dec!(40),
            },
            StressArchetype::DelayedDistributions => match severity {
                Mild => dec!(30),
                Moderate => dec!(60),
                Severe => dec!(120),
            },
            StressArchetype::TaxSpike => match severity {
                Mild => dec!(10),
                Moderate => dec!(25),
                Severe => dec!(50),
            },
            StressArchetype::DebtRateShock => match severity {
                Mild => dec!(100),
                Moderate => dec!(250),
                Severe => dec!(500),
            },
            StressArchetype::CapitalCallAcceleration => match severity {
                Mild => dec!(-15),
                Moderate => dec!(-30),
                Severe => dec!(-60),
            },
        }
    }

    /// Build the transient scenario overlay for this archetype.
    pub fn overlay(&self, magnitude: Decimal) -> ScenarioAdjustments {
        let days = magnitude.to_i64().unwrap_or(0);
        match self {
            StressArchetype::MarketDrawdown => ScenarioAdjustments {
                inflow_haircut_pct: Some(magnitude),
                ..Default::default()
            },
            StressArchetype::DelayedDistributions => ScenarioAdjustments {
                distribution_delay_days: Some(days),
                ..Default::default()
            },
            StressArchetype::TaxSpike => ScenarioAdjustments {
                outflow_increase_pct: Some(magnitude),
                ..Default::default()
            },
            StressArchetype::DebtRateShock => ScenarioAdjustments {
                rate_shock_bps: Some(magnitude),
                ..Default::default()
            },
            StressArchetype::CapitalCallAcceleration => ScenarioAdjustments {
                capital_call_shift_days: Some(days),
                ..Default::default()
            },
        }
    }
}

impl fmt::Display for StressArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StressArchetype::MarketDrawdown => "market drawdown",
            StressArchetype::DelayedDistributions => "delayed distributions",
            StressArchetype::TaxSpike => "tax spike",
            StressArchetype::DebtRateShock => "debt rate shock",
            StressArchetype::CapitalCallAcceleration => "capital call acceleration",
        };
        write!(f, "{}", label)
    }
}

/// Severity tier selecting an archetype's default magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressSeverity {
    Mild,
    Moderate,
    Severe,
}

impl StressSeverity {
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "mild" => Some(StressSeverity::Mild),
            "moderate" => Some(StressSeverity::Moderate),
            "severe" => Some(StressSeverity::Severe),
            _ => None,
        }
    }
}

impl fmt::Display for StressSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StressSeverity::Mild => "mild",
            StressSeverity::Moderate => "moderate",
            StressSeverity::Severe => "severe",
        };
        write!(f, "{}", label)
    }
}
