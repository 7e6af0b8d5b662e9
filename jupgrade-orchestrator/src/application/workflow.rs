//! Upgrade Workflow - phase-driven controller for one upgrade run.
//!
//! Every phase change goes through [`UpgradeOrchestrator`], which validates it
//! against the state machine defined on [`UpgradePhase`] and records it on the
//! [`UpgradeSession`].
//!
//! ```text
//! Caller        Orchestrator       Planner   Recipes   Deps   Validation   History
//!   │                │                │         │        │         │          │
//!   ├─ run() ───────►│ lock + analyze │         │        │         │          │
//!   │                ├─ generate ────►│         │        │         │          │
//!   │                ├─ confirm       │         │        │         │          │
//!   │                ├─ record_start ─┼─────────┼────────┼─────────┼─────────►│
//!   │                ├─ backup / before checkpoint       │         │          │
//!   │                ├─ apply ─────────────────►│        │         │          │
//!   │                ├─ apply_updates ──────────┼───────►│         │          │
//!   │                ├─ validate ───────────────┼────────┼────────►│          │
//!   │                ├─ finish ─────────────────┼────────┼─────────┼─────────►│
//!   │◄── outcome ────┤ report                   │        │         │          │
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use jupgrade_core::application::errors::UpgradeError;
use jupgrade_core::application::reporting::{ReportService, UpgradeReport};
use jupgrade_core::config::{Config, GitConfig};
use jupgrade_core::domain::project::ProjectInfo;
use jupgrade_core::domain::upgrade::{UpgradePlan, UpgradeResult, UpgradeStatus};
use jupgrade_deps::DependencyManager;

use crate::application::analyzer::ProjectAnalyzer;
use crate::application::history::HistoryService;
use crate::application::planner::UpgradePlanner;
use crate::application::validation::ValidationStage;
use crate::domain::entities::UpgradeSession;
use crate::domain::services::{
    BackupStore, PlanConfirmation, ProgressReporter, RecipeRunner, VersionControl,
};
use crate::domain::value_objects::{
    PhaseTransitionError, PlanDecision, ProgressStep, UpgradeOptions, UpgradePhase,
};
use crate::infrastructure::lock::UpgradeLock;

/// Errors from the workflow layer.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Invalid phase transition: {0}")]
    InvalidTransition(#[from] PhaseTransitionError),

    #[error(transparent)]
    Upgrade(#[from] UpgradeError),
}

impl WorkflowError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WorkflowError::Upgrade(e) if e.is_cancelled())
    }
}

impl From<jupgrade_core::infrastructure::state::StateError> for WorkflowError {
    fn from(e: jupgrade_core::infrastructure::state::StateError) -> Self {
        WorkflowError::Upgrade(e.into())
    }
}

/// Everything the orchestrator talks to
pub struct UpgradeServices {
    pub analyzer: ProjectAnalyzer,
    pub planner: UpgradePlanner,
    pub dependencies: DependencyManager,
    pub recipes: Arc<dyn RecipeRunner>,
    pub validation: ValidationStage,
    pub version_control: Arc<dyn VersionControl>,
    pub backups: Arc<dyn BackupStore>,
    pub history: HistoryService,
    pub reports: Arc<dyn ReportService>,
    pub confirmation: Arc<dyn PlanConfirmation>,
    pub progress: Arc<dyn ProgressReporter>,
}

/// Settings the orchestrator reads directly
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub backup_before_upgrade: bool,
    pub git: GitConfig,
}

impl From<&Config> for OrchestratorSettings {
    fn from(config: &Config) -> Self {
        Self {
            backup_before_upgrade: config.upgrade.backup_before_upgrade,
            git: config.git.clone(),
        }
    }
}

/// What happened to a finished run
#[derive(Debug, Clone)]
pub struct UpgradeSummary {
    pub history_id: Uuid,
    pub status: UpgradeStatus,
    pub project: ProjectInfo,
    pub plan: UpgradePlan,
    pub result: UpgradeResult,
    pub checkpoints: Vec<String>,
    pub backup_id: Option<String>,
    pub report_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum UpgradeOutcome {
    /// Planning only; nothing was changed
    DryRun {
        project: ProjectInfo,
        plan: UpgradePlan,
    },
    /// The user declined the plan; nothing was changed
    Rejected {
        project: ProjectInfo,
        plan: UpgradePlan,
    },
    Finished(Box<UpgradeSummary>),
}

/// Restore points made during execution
#[derive(Default)]
struct Checkpoints {
    git: bool,
    tags: Vec<String>,
    before_tag: Option<String>,
    backup_id: Option<String>,
}

/// Drives one upgrade at a time through its phases.
pub struct UpgradeOrchestrator {
    services: UpgradeServices,
    settings: OrchestratorSettings,
    session: Mutex<UpgradeSession>,
}

impl UpgradeOrchestrator {
    pub fn new(services: UpgradeServices, settings: OrchestratorSettings) -> Self {
        Self {
            services,
            settings,
            session: Mutex::new(UpgradeSession::new()),
        }
    }

    /// Snapshot of the current session
    pub async fn session(&self) -> UpgradeSession {
        self.session.lock().await.clone()
    }

    pub fn history(&self) -> &HistoryService {
        &self.services.history
    }

    async fn transition(&self, to: UpgradePhase, reason: &str) -> Result<(), WorkflowError> {
        self.session
            .lock()
            .await
            .transition(to, Some(reason.to_string()))?;
        Ok(())
    }

    /// Run the whole workflow for the project at `root`.
    ///
    /// Holds the project's upgrade lock until it returns.
    #[instrument(skip(self, options, cancel), fields(root = %root.display(), dry_run = options.dry_run))]
    pub async fn run(
        &self,
        root: &Path,
        options: &UpgradeOptions,
        cancel: &CancellationToken,
    ) -> Result<UpgradeOutcome, WorkflowError> {
        let lock = UpgradeLock::acquire(root)?;
        self.session.lock().await.reset()?;

        let outcome = match self.drive(root, options, cancel).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => Err(self.fail(e).await),
        };

        drop(lock);
        outcome
    }

    async fn drive(
        &self,
        root: &Path,
        options: &UpgradeOptions,
        cancel: &CancellationToken,
    ) -> Result<UpgradeOutcome, WorkflowError> {
        let progress = self.services.progress.as_ref();

        self.transition(UpgradePhase::Analyzing, "Upgrade started")
            .await?;
        progress.step(&ProgressStep::Analyzing);
        let project = self.services.analyzer.analyze_project(root).await?;
        check_cancelled(cancel)?;

        self.transition(UpgradePhase::PlanningUpgrade, "Project analyzed")
            .await?;
        progress.step(&ProgressStep::Planning);
        let plan = self.services.planner.generate_plan(&project).await;
        check_cancelled(cancel)?;

        if options.dry_run {
            self.transition(UpgradePhase::Idle, "Dry run").await?;
            return Ok(UpgradeOutcome::DryRun { project, plan });
        }

        if self.services.confirmation.confirm(&project, &plan).await == PlanDecision::Rejected {
            info!("Upgrade plan rejected");
            self.transition(UpgradePhase::Idle, "Plan rejected").await?;
            return Ok(UpgradeOutcome::Rejected { project, plan });
        }
        check_cancelled(cancel)?;

        self.transition(UpgradePhase::ExecutingUpgrade, "Plan approved")
            .await?;
        let history_id = self
            .services
            .history
            .record_start(
                &project.current_java_version,
                plan.target_java_version(),
                project.build_system,
            )
            .await?;
        self.session.lock().await.history_id = Some(history_id);

        let mut checkpoints = Checkpoints::default();
        let edited = self
            .execute(&project, &plan, &mut checkpoints, cancel)
            .await?;

        self.transition(UpgradePhase::Validating, "Changes applied")
            .await?;
        let mut result = self
            .services
            .validation
            .validate(&project, &plan, progress, cancel)
            .await?;
        result.changed_files = self.changed_files(&project, &checkpoints, edited).await;

        let status = if result.is_success() {
            UpgradeStatus::Completed
        } else {
            UpgradeStatus::Failed
        };
        let message = (!result.is_success()).then(|| validation_message(&result));
        self.services
            .history
            .finish(history_id, status, message)
            .await?;

        progress.step(&ProgressStep::WritingReport);
        let report = UpgradeReport::new(history_id, &project, &plan, result.clone(), status)
            .with_checkpoints(checkpoints.tags.clone())
            .with_backup_id(checkpoints.backup_id.clone());
        let report_paths = match self.services.reports.write_report(&report).await {
            Ok(paths) => paths,
            Err(e) => {
                progress.warn(&format!("Could not write the upgrade report: {}", e));
                Vec::new()
            }
        };

        self.transition(UpgradePhase::Complete, status.to_string().as_str())
            .await?;
        progress.finished(&result);
        info!(history_id = %history_id, status = %status, "Upgrade finished");

        Ok(UpgradeOutcome::Finished(Box::new(UpgradeSummary {
            history_id,
            status,
            project,
            plan,
            result,
            checkpoints: checkpoints.tags,
            backup_id: checkpoints.backup_id,
            report_paths,
        })))
    }

    /// Backup, checkpoints, recipes and dependency updates. Returns the
    /// manifests rewritten by the dependency step.
    async fn execute(
        &self,
        project: &ProjectInfo,
        plan: &UpgradePlan,
        checkpoints: &mut Checkpoints,
        cancel: &CancellationToken,
    ) -> Result<Vec<PathBuf>, WorkflowError> {
        let root = project.root.as_path();
        let progress = self.services.progress.as_ref();
        let vc = self.services.version_control.as_ref();
        let git = &self.settings.git;

        if self.settings.backup_before_upgrade {
            progress.step(&ProgressStep::BackingUp);
            checkpoints.backup_id = Some(self.services.backups.create(root).await?);
        }
        check_cancelled(cancel)?;

        checkpoints.git = git.enabled && vc.is_repository(root).await;
        let run_tag = Uuid::new_v4().simple().to_string()[..8].to_string();
        if checkpoints.git {
            if git.stash_uncommitted
                && vc
                    .stash_uncommitted(root, "jupgrade: work in progress before upgrade")
                    .await?
            {
                progress.warn("Uncommitted changes were stashed before the upgrade");
            }
            let branch = format!(
                "{}-java{}-{}",
                git.branch_prefix,
                plan.target_java_version(),
                run_tag
            );
            vc.create_branch(root, &branch).await?;
            let tag = self.checkpoint(root, &run_tag, "before", checkpoints).await?;
            checkpoints.before_tag = Some(tag);
        }
        check_cancelled(cancel)?;

        self.services
            .recipes
            .apply_recipes(
                project,
                plan.recipes(),
                plan.enable_preview_features(),
                progress,
                cancel,
            )
            .await?;
        if checkpoints.git {
            vc.commit_all(
                root,
                &format!("jupgrade: apply {} recipes", plan.recipes().len()),
            )
            .await?;
            self.checkpoint(root, &run_tag, "recipes", checkpoints)
                .await?;
        }
        check_cancelled(cancel)?;

        progress.step(&ProgressStep::UpdatingDependencies(
            plan.dependency_updates().len(),
        ));
        let edited = self
            .services
            .dependencies
            .apply_updates(project, plan.dependency_updates())
            .await?;
        if checkpoints.git {
            vc.commit_all(
                root,
                &format!(
                    "jupgrade: update {} dependencies",
                    plan.dependency_updates().len()
                ),
            )
            .await?;
            self.checkpoint(root, &run_tag, "dependencies", checkpoints)
                .await?;
        }
        check_cancelled(cancel)?;

        Ok(edited)
    }

    async fn checkpoint(
        &self,
        root: &Path,
        run_tag: &str,
        label: &str,
        checkpoints: &mut Checkpoints,
    ) -> Result<String, UpgradeError> {
        let tag = format!("{}-{}-{}", self.settings.git.tag_prefix, run_tag, label);
        self.services
            .progress
            .step(&ProgressStep::Checkpoint(tag.clone()));
        self.services.version_control.tag(root, &tag).await?;
        checkpoints.tags.push(tag.clone());
        Ok(tag)
    }

    /// Git diff against the `before` checkpoint, else the backup diff, else
    /// the edited manifests
    async fn changed_files(
        &self,
        project: &ProjectInfo,
        checkpoints: &Checkpoints,
        edited: Vec<PathBuf>,
    ) -> Vec<PathBuf> {
        let root = project.root.as_path();
        if let Some(tag) = &checkpoints.before_tag {
            match self
                .services
                .version_control
                .changed_files_since(root, tag)
                .await
            {
                Ok(files) => return files,
                Err(e) => warn!(error = %e, "Could not diff against the checkpoint"),
            }
        }
        if let Some(id) = &checkpoints.backup_id {
            match self.services.backups.changed_files(root, id).await {
                Ok(files) => return files,
                Err(e) => warn!(error = %e, "Could not diff against the backup"),
            }
        }
        edited
    }

    /// Move to Error and close the history entry
    async fn fail(&self, e: WorkflowError) -> WorkflowError {
        let (history_id, transition) = {
            let mut session = self.session.lock().await;
            session.error = Some(e.to_string());
            let transition = if session.phase.can_transition_to(&UpgradePhase::Error) {
                session.transition(UpgradePhase::Error, Some(e.to_string()))
            } else {
                Ok(())
            };
            (session.history_id, transition)
        };
        if let Err(t) = transition {
            error!(error = %t, "Could not enter the error phase");
        }

        if let Some(id) = history_id {
            let status = if e.is_cancelled() {
                UpgradeStatus::Cancelled
            } else {
                UpgradeStatus::Failed
            };
            if let Err(state_err) = self
                .services
                .history
                .finish(id, status, Some(e.to_string()))
                .await
            {
                error!(error = %state_err, "Could not update upgrade history");
            }
        }

        if e.is_cancelled() {
            warn!("Upgrade cancelled");
        } else {
            error!(error = %e, "Upgrade failed");
        }
        e
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<(), UpgradeError> {
    if cancel.is_cancelled() {
        Err(UpgradeError::Cancelled)
    } else {
        Ok(())
    }
}

fn validation_message(result: &UpgradeResult) -> String {
    if !result.build_success {
        "Build failed after upgrade".to_string()
    } else {
        "Tests failed after upgrade".to_string()
    }
}
