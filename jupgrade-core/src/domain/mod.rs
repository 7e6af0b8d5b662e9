//! Domain Layer - Core models of an upgrade run
//!
//! Pure data: the analyzed project, version ordering, the upgrade plan and its
//! history, and vulnerability findings. Nothing here performs I/O.

pub mod project;
pub mod upgrade;
pub mod version;
pub mod vulnerability;

pub use project::*;
pub use upgrade::*;
pub use version::*;
pub use vulnerability::*;
