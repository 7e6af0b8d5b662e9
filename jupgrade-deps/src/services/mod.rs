//! Dependency services
//!
//! Version resolution against the registry, conflict detection, and manifest
//! updates.

pub mod dependency_manager;
pub mod dependency_resolver;

pub use dependency_manager::*;
pub use dependency_resolver::*;
