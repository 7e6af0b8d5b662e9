//! jupgrade Dependencies - Version resolution and manifest updates
//!
//! Finds the newest acceptable release of each declared dependency, reports
//! artifacts declared at several versions, and writes chosen versions back
//! into `pom.xml` or the Gradle build script.
//!
//! # Usage
//!
//! ```rust,ignore
//! use jupgrade_deps::{DependencyResolver, DependencyResolverService, ResolutionConstraints};
//!
//! let resolver = DependencyResolver::new(Arc::new(maven_central));
//! let latest = resolver
//!     .resolve_latest_version(&coordinate, &ResolutionConstraints::default())
//!     .await?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! jupgrade-deps/
//! ├── domain/     # VersionConstraint (Maven version ranges)
//! └── services/   # Resolver, conflict check, manifest manager
//! ```

pub mod domain;
pub mod services;

pub use domain::*;
pub use services::*;
