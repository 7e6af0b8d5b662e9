//! In-process stand-ins for the orchestrator's collaborators

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use jupgrade_core::application::errors::UpgradeError;
use jupgrade_core::application::reporting::FileReportService;
use jupgrade_core::config::Config;
use jupgrade_core::domain::project::{DependencyCoordinate, ProjectInfo};
use jupgrade_core::domain::version::ArtifactVersion;
use jupgrade_core::domain::vulnerability::VulnerabilityIssue;
use jupgrade_core::infrastructure::registries::{PackageRegistryClient, RegistryError};
use jupgrade_core::infrastructure::state::InMemoryStateStore;
use jupgrade_deps::{DependencyManager, DependencyResolverService, ResolutionConstraints};
use jupgrade_orchestrator::application::{
    HistoryService, ProjectAnalyzer, UpgradePlanner, ValidationStage,
};
use jupgrade_orchestrator::domain::{
    BuildRunner, FixedDecision, LogProgress, PlanDecision, ProgressReporter, RecipeRunner,
    VersionControl, VulnerabilityScanner,
};
use jupgrade_orchestrator::infrastructure::{FileBackupStore, GitVersionControl};
use jupgrade_orchestrator::{OrchestratorSettings, UpgradeOrchestrator, UpgradeServices};

/// Latest versions keyed by `group:artifact`; `None` means the lookup fails
#[derive(Default)]
pub struct FakeResolver {
    latest: HashMap<String, Option<String>>,
}

impl FakeResolver {
    pub fn with(mut self, key: &str, latest: &str) -> Self {
        self.latest.insert(key.to_string(), Some(latest.to_string()));
        self
    }

    pub fn failing(mut self, key: &str) -> Self {
        self.latest.insert(key.to_string(), None);
        self
    }
}

#[async_trait]
impl DependencyResolverService for FakeResolver {
    async fn resolve_latest_version(
        &self,
        coordinate: &DependencyCoordinate,
        _constraints: &ResolutionConstraints,
    ) -> Result<Option<ArtifactVersion>, RegistryError> {
        match self.latest.get(&coordinate.key()) {
            Some(Some(version)) => Ok(Some(ArtifactVersion::parse(version))),
            Some(None) => Err(RegistryError::Http {
                message: "connection refused".into(),
                status: None,
            }),
            None => Ok(None),
        }
    }
}

/// Registry publishing the same versions for every artifact
pub struct FixedRegistry(pub Vec<&'static str>);

#[async_trait]
impl PackageRegistryClient for FixedRegistry {
    async fn list_versions(
        &self,
        _coordinate: &DependencyCoordinate,
    ) -> Result<Vec<ArtifactVersion>, RegistryError> {
        Ok(self.0.iter().map(|v| ArtifactVersion::parse(v)).collect())
    }
}

/// Records every recipe batch it is asked to apply
#[derive(Default)]
pub struct RecordingRecipeRunner {
    pub calls: Mutex<Vec<Vec<String>>>,
    pub fail_with: Option<String>,
    pub cancel_during_run: bool,
    /// Whether the upgrade lock file was on disk at each call
    pub lock_seen: Mutex<Vec<bool>>,
}

impl RecordingRecipeRunner {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RecipeRunner for RecordingRecipeRunner {
    async fn apply_recipes(
        &self,
        project: &ProjectInfo,
        recipes: &[String],
        _enable_preview: bool,
        _progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<(), UpgradeError> {
        self.calls.lock().unwrap().push(recipes.to_vec());
        self.lock_seen
            .lock()
            .unwrap()
            .push(project.root.join(".jupgrade/upgrade.lock").exists());
        if self.cancel_during_run {
            cancel.cancel();
        }
        match &self.fail_with {
            Some(recipe) => Err(UpgradeError::recipe_failure(recipe, "exit status 1")),
            None => Ok(()),
        }
    }
}

pub struct FakeBuild {
    pub compiles: bool,
    pub tests_pass: bool,
    pub test_runs: AtomicUsize,
}

impl FakeBuild {
    pub fn passing() -> Self {
        Self {
            compiles: true,
            tests_pass: true,
            test_runs: AtomicUsize::new(0),
        }
    }

    pub fn failing_tests() -> Self {
        Self {
            tests_pass: false,
            ..Self::passing()
        }
    }
}

#[async_trait]
impl BuildRunner for FakeBuild {
    async fn compile(
        &self,
        _: &ProjectInfo,
        _: bool,
        _: &CancellationToken,
    ) -> Result<bool, UpgradeError> {
        Ok(self.compiles)
    }

    async fn test(
        &self,
        _: &ProjectInfo,
        _: bool,
        _: &CancellationToken,
    ) -> Result<bool, UpgradeError> {
        self.test_runs.fetch_add(1, Ordering::SeqCst);
        Ok(self.tests_pass)
    }
}

pub struct NoVulnerabilities;

#[async_trait]
impl VulnerabilityScanner for NoVulnerabilities {
    async fn scan(
        &self,
        _: &[DependencyCoordinate],
        _: &CancellationToken,
    ) -> Result<Vec<VulnerabilityIssue>, UpgradeError> {
        Ok(Vec::new())
    }
}

/// A work tree that is never a git repository
pub struct NoRepository;

#[async_trait]
impl VersionControl for NoRepository {
    async fn is_repository(&self, _: &Path) -> bool {
        false
    }
    async fn stash_uncommitted(&self, _: &Path, _: &str) -> Result<bool, UpgradeError> {
        unreachable!("no repository")
    }
    async fn create_branch(&self, _: &Path, _: &str) -> Result<(), UpgradeError> {
        unreachable!("no repository")
    }
    async fn commit_all(&self, _: &Path, _: &str) -> Result<Option<String>, UpgradeError> {
        unreachable!("no repository")
    }
    async fn tag(&self, _: &Path, _: &str) -> Result<(), UpgradeError> {
        unreachable!("no repository")
    }
    async fn changed_files_since(&self, _: &Path, _: &str) -> Result<Vec<PathBuf>, UpgradeError> {
        unreachable!("no repository")
    }
    async fn list_tags(&self, _: &Path, _: &str) -> Result<Vec<String>, UpgradeError> {
        Ok(Vec::new())
    }
    async fn reset_to(&self, _: &Path, _: &str) -> Result<(), UpgradeError> {
        unreachable!("no repository")
    }
}

/// Orchestrator plus handles to the fakes it was built with
pub struct Harness {
    pub orchestrator: UpgradeOrchestrator,
    pub recipes: Arc<RecordingRecipeRunner>,
    pub build: Arc<FakeBuild>,
    pub state: Arc<InMemoryStateStore>,
}

pub struct HarnessBuilder {
    pub config: Config,
    pub decision: PlanDecision,
    pub resolver: FakeResolver,
    pub recipes: RecordingRecipeRunner,
    pub build: FakeBuild,
    /// Use the git2 backed version control instead of a non-repository
    pub real_git: bool,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
            decision: PlanDecision::Approved,
            resolver: FakeResolver::default(),
            recipes: RecordingRecipeRunner::default(),
            build: FakeBuild::passing(),
            real_git: false,
        }
    }
}

impl HarnessBuilder {
    pub fn build(self, reports_dir: &Path) -> Harness {
        let recipes = Arc::new(self.recipes);
        let build = Arc::new(self.build);
        let state = Arc::new(InMemoryStateStore::new());
        let config = self.config;
        let version_control: Arc<dyn VersionControl> = if self.real_git {
            Arc::new(GitVersionControl::new())
        } else {
            Arc::new(NoRepository)
        };

        let services = UpgradeServices {
            analyzer: ProjectAnalyzer::new(config.upgrade.build_tool),
            planner: UpgradePlanner::new(Arc::new(self.resolver), config.upgrade.clone()),
            dependencies: DependencyManager::new(),
            recipes: recipes.clone(),
            validation: ValidationStage::new(
                build.clone(),
                Arc::new(NoVulnerabilities),
                &config.upgrade,
                &config.security,
            ),
            version_control,
            backups: Arc::new(FileBackupStore::new()),
            history: HistoryService::new(state.clone(), config.state.max_history_entries),
            reports: Arc::new(FileReportService::with_output_dir(reports_dir)),
            confirmation: Arc::new(FixedDecision(self.decision)),
            progress: Arc::new(LogProgress),
        };

        Harness {
            orchestrator: UpgradeOrchestrator::new(services, OrchestratorSettings::from(&config)),
            recipes,
            build,
            state,
        }
    }
}
