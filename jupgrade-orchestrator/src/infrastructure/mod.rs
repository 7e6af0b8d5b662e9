//! Orchestrator infrastructure: external tools, version control, backups

pub mod backup;
pub mod build_tool;
pub mod git;
pub mod lock;
pub mod openrewrite;
pub mod project_detection;
pub mod vulnerability_scanner;

pub use backup::FileBackupStore;
pub use build_tool::ProcessBuildRunner;
pub use git::GitVersionControl;
pub use lock::UpgradeLock;
pub use openrewrite::OpenRewriteRunner;
pub use vulnerability_scanner::NvdVulnerabilityScanner;
