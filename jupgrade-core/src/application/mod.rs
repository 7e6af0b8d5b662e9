//! Application Layer - Shared error taxonomy and report rendering

pub mod errors;
pub mod reporting;

pub use errors::*;
pub use reporting::*;
