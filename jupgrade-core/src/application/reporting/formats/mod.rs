//! Report format implementations

pub mod json;
pub mod markdown;

pub use json::*;
pub use markdown::*;
