//! Common test utilities for jupgrade-deps

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
