//! Archetype-driven stress tests diffed against a baseline forecast.

pub mod archetype;
pub mod engine;

pub use archetype::{StressArchetype, StressSeverity};
