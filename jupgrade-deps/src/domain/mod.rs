//! Domain models for dependency resolution

pub mod version_constraint;

pub use version_constraint::*;
