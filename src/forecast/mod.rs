//! Daily cash-balance projection over a horizon.

pub mod engine;
pub mod result;
