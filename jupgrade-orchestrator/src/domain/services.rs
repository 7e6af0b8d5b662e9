//! Orchestrator domain services
//!
//! Seams between the workflow and everything that touches the outside world.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use jupgrade_core::application::errors::UpgradeError;
use jupgrade_core::domain::project::{DependencyCoordinate, ProjectInfo};
use jupgrade_core::domain::upgrade::{UpgradePlan, UpgradeResult};
use jupgrade_core::domain::vulnerability::VulnerabilityIssue;

use super::value_objects::{PlanDecision, ProgressStep};

/// Asks the user whether to go ahead with a plan
#[async_trait]
pub trait PlanConfirmation: Send + Sync {
    async fn confirm(&self, project: &ProjectInfo, plan: &UpgradePlan) -> PlanDecision;
}

/// Receives progress notifications
pub trait ProgressReporter: Send + Sync {
    fn step(&self, step: &ProgressStep);

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn finished(&self, _result: &UpgradeResult) {}
}

/// Applies OpenRewrite recipes to a project
#[async_trait]
pub trait RecipeRunner: Send + Sync {
    /// Run the recipes in order, stopping at the first failure
    async fn apply_recipes(
        &self,
        project: &ProjectInfo,
        recipes: &[String],
        enable_preview: bool,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<(), UpgradeError>;
}

/// Compiles and tests a project
#[async_trait]
pub trait BuildRunner: Send + Sync {
    /// `Ok(false)` when the build ran and failed
    async fn compile(
        &self,
        project: &ProjectInfo,
        enable_preview: bool,
        cancel: &CancellationToken,
    ) -> Result<bool, UpgradeError>;

    /// `Ok(false)` when tests ran and failed
    async fn test(
        &self,
        project: &ProjectInfo,
        enable_preview: bool,
        cancel: &CancellationToken,
    ) -> Result<bool, UpgradeError>;
}

/// Looks up known vulnerabilities for dependencies
#[async_trait]
pub trait VulnerabilityScanner: Send + Sync {
    async fn scan(
        &self,
        dependencies: &[DependencyCoordinate],
        cancel: &CancellationToken,
    ) -> Result<Vec<VulnerabilityIssue>, UpgradeError>;
}

/// Version control checkpoints
#[async_trait]
pub trait VersionControl: Send + Sync {
    async fn is_repository(&self, root: &Path) -> bool;

    /// Stash uncommitted work; `Ok(false)` when there was nothing to stash
    async fn stash_uncommitted(&self, root: &Path, message: &str) -> Result<bool, UpgradeError>;

    /// Create `name` at HEAD and switch to it
    async fn create_branch(&self, root: &Path, name: &str) -> Result<(), UpgradeError>;

    /// Commit every change in the work tree; `Ok(None)` when it is clean
    async fn commit_all(&self, root: &Path, message: &str) -> Result<Option<String>, UpgradeError>;

    /// Lightweight tag at HEAD
    async fn tag(&self, root: &Path, name: &str) -> Result<(), UpgradeError>;

    /// Files that differ between `tag` and the work tree
    async fn changed_files_since(&self, root: &Path, tag: &str)
    -> Result<Vec<PathBuf>, UpgradeError>;

    async fn list_tags(&self, root: &Path, prefix: &str) -> Result<Vec<String>, UpgradeError>;

    /// Hard-reset the current branch and work tree to `tag`
    async fn reset_to(&self, root: &Path, tag: &str) -> Result<(), UpgradeError>;
}

/// Full-copy project backups
#[async_trait]
pub trait BackupStore: Send + Sync {
    /// Copy the project and return the backup identifier
    async fn create(&self, root: &Path) -> Result<String, UpgradeError>;

    /// Backup identifiers, oldest first
    async fn list(&self, root: &Path) -> Result<Vec<String>, UpgradeError>;

    /// Copy the backup over the project
    async fn restore(&self, root: &Path, backup_id: &str) -> Result<Vec<PathBuf>, UpgradeError>;

    /// Files whose content differs from the backup
    async fn changed_files(&self, root: &Path, backup_id: &str)
    -> Result<Vec<PathBuf>, UpgradeError>;
}

/// Approves or rejects every plan without asking
pub struct FixedDecision(pub PlanDecision);

#[async_trait]
impl PlanConfirmation for FixedDecision {
    async fn confirm(&self, _project: &ProjectInfo, _plan: &UpgradePlan) -> PlanDecision {
        self.0
    }
}

/// Progress sink that only logs
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn step(&self, step: &ProgressStep) {
        tracing::info!(step = %step, "Upgrade progress");
    }
}
