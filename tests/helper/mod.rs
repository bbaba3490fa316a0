//! Shared test utilities

pub mod fixtures;
pub mod tools;

pub use fixtures::*;
pub use tools::*;
