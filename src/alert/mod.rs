//! Rule-driven liquidity alerts: generation, deduplication, escalation.

pub mod alert;
pub mod engine;
pub mod rules;
