//! Common test utilities for jupgrade-orchestrator

#![allow(dead_code)]

pub mod fakes;
pub mod fixtures;

pub use fakes::*;
pub use fixtures::*;
