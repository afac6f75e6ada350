//! # liquidity-engine
//!
//! Liquidity forecasting and stress-testing engine for wealth-management
//! cash flows.
//!
//! Given current cash positions and a set of expected cash movements, the
//! engine projects a day-by-day balance timeline over a horizon, applies
//! named adjustment scenarios, runs archetype-driven stress tests against
//! the baseline, and derives deduplicated liquidity alerts with suggested
//! remediation actions.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: clients, currencies, positions, flows
//! - **importer** — Normalizes heterogeneous source records into flows
//! - **scenario** — Named, composable adjustment sets with validation
//! - **forecast** — Recurrence expansion and the daily balance projection
//! - **stress** — Archetype + severity overlays diffed against a baseline
//! - **alert** — Rule-driven alert generation, deduplication, escalation
//! - **simulation** — Random portfolio generation for tests and benchmarks
//!
//! All engine operations are pure, synchronous functions of their inputs:
//! identical positions, flows, scenario, and horizon always reproduce the
//! same result.

pub mod alert;
pub mod core;
pub mod forecast;
pub mod importer;
pub mod scenario;
pub mod simulation;
pub mod stress;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::alert::alert::{AlertSeverity, AlertStatus, LiquidityAlert};
    pub use crate::alert::engine::AlertEngine;
    pub use crate::alert::rules::AlertRule;
    pub use crate::core::client::ClientId;
    pub use crate::core::currency::CurrencyCode;
    pub use crate::core::flow::{CashFlow, FlowCategory, FlowDirection, FlowSet};
    pub use crate::core::position::{CashPosition, PositionScope};
    pub use crate::forecast::engine::{ForecastEngine, ForecastParams};
    pub use crate::forecast::result::ForecastResult;
    pub use crate::importer::import::FlowImporter;
    pub use crate::scenario::adjustments::ScenarioAdjustments;
    pub use crate::stress::engine::{StressEngine, StressTestResult};
    pub use crate::stress::{StressArchetype, StressSeverity};
}
