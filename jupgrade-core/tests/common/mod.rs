//! Common test utilities for jupgrade-core

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
