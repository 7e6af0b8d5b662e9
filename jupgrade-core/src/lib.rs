//! jupgrade Core - Foundation crate for the jupgrade upgrade assistant
//!
//! This crate provides the shared pieces used by the resolver, the orchestrator
//! and the command-line front end:
//!
//! # Modules
//!
//! - [`config`] - Strongly-typed configuration with TOML and environment variable support
//! - [`domain`] - Project, dependency, plan and history models
//! - [`application`] - Error taxonomy and upgrade reporting
//! - [`infrastructure`] - Manifest parsers and rewriters, registry and NVD clients,
//!   subprocess execution, persisted state
//! - [`logging`] - Structured logging with tracing
//!
//! # Architecture
//!
//! ```text
//! jupgrade-core/
//! ├── domain/           # Pure models: ProjectInfo, UpgradePlan, history
//! ├── application/      # Errors and report rendering
//! ├── infrastructure/   # External integrations
//! │   ├── parsers/      # pom.xml / build.gradle readers
//! │   ├── manifest/     # pom.xml / build.gradle version rewriters
//! │   ├── registries/   # Maven Central search client
//! │   ├── api_clients/  # NVD client
//! │   ├── process.rs    # Cancellable subprocess execution
//! │   └── state/        # Durable key-value state
//! └── config/           # Configuration management
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use jupgrade_core::Config;
//!
//! let config = Config::load_for_workspace(&workspace, None)?;
//! ```
//!
//! Environment variables use the `JUPGRADE__` prefix with double underscore separators:
//!
//! ```bash
//! JUPGRADE__UPGRADE__TARGET_JAVA_VERSION=21
//! JUPGRADE__SECURITY__MIN_SEVERITY_LEVEL=HIGH
//! ```
//!
//! # Logging
//!
//! ```rust,ignore
//! use jupgrade_core::init_tracing;
//!
//! init_tracing(&config.logging)?;
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
