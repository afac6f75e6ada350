//! Random portfolio generation for exercising the engines.

pub mod generator;
