//! Foundational value types: clients, currencies, positions, flows.

pub mod client;
pub mod currency;
pub mod flow;
pub mod position;
