//! jupgrade Orchestrator - Drives a Java upgrade from analysis to report
//!
//! This crate owns the upgrade workflow and the collaborators that touch the
//! outside world: the build tool, OpenRewrite, git and on-disk backups.
//!
//! # Workflow
//!
//! ```text
//! Idle ─► Analyzing ─► PlanningUpgrade ─► ExecutingUpgrade ─► Validating ─► Complete
//!              │              │  │                │                │
//!              │              │  └─ rejected ─► Idle               │
//!              └──────────────┴─────────────► Error ◄──────────────┘
//! ```
//!
//! # Architecture
//!
//! ```text
//! jupgrade-orchestrator/
//! ├── application/          # Analyzer, planner, validation, workflow, history
//! │   ├── workflow.rs       # UpgradeOrchestrator state machine
//! │   ├── planner.rs        # LTS and Spring Boot targets, recipe selection
//! │   ├── test_generation.rs
//! │   └── restore.rs        # Manual checkpoint and backup restore
//! ├── infrastructure/       # External integrations
//! │   ├── openrewrite.rs    # Recipe runner (Maven plugin / Gradle init script)
//! │   ├── build_tool.rs     # compile and test
//! │   ├── git/              # libgit2 checkpoints
//! │   ├── backup.rs         # Full-copy backups under .jupgrade/backups
//! │   └── lock.rs           # Per-project run lock
//! └── domain/               # Phases, session, service traits
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let orchestrator = UpgradeOrchestrator::new(services, OrchestratorSettings::from(&config));
//! let outcome = orchestrator
//!     .run(&root, &UpgradeOptions::default(), &CancellationToken::new())
//!     .await?;
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{
    OrchestratorSettings, UpgradeOrchestrator, UpgradeOutcome, UpgradeServices, UpgradeSummary,
    WorkflowError,
};
pub use domain::{PlanDecision, ProgressReporter, ProgressStep, UpgradeOptions, UpgradePhase};
