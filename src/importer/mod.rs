//! Normalization of heterogeneous source records into canonical cash flows.

pub mod import;
pub mod source;
