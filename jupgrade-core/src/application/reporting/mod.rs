//! Reporting module for upgrade reports
//!
//! Builds an [`UpgradeReport`] from a finished run and renders it as Markdown
//! for people or JSON for tooling.

pub mod formats;
pub mod models;
pub mod service;

pub use models::*;
pub use service::*;
