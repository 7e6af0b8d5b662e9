//! CLI Context - Service wiring for CLI operations
//!
//! Loads configuration, installs logging and builds the concrete services each
//! command needs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use jupgrade_core::application::errors::UpgradeError;
use jupgrade_core::application::reporting::FileReportService;
use jupgrade_core::config::{Config, ConfigLoadError, LoggingConfig};
use jupgrade_core::infrastructure::state::{FileStateStore, StateStore};
use jupgrade_core::infrastructure::{MavenCentralClient, NvdClient};
use jupgrade_deps::{DependencyManager, DependencyResolver};
use jupgrade_orchestrator::application::{
    HistoryService, ProjectAnalyzer, RestoreService, UpgradePlanner, ValidationStage,
};
use jupgrade_orchestrator::domain::{PlanConfirmation, ProgressReporter};
use jupgrade_orchestrator::infrastructure::{
    FileBackupStore, GitVersionControl, NvdVulnerabilityScanner, OpenRewriteRunner,
    ProcessBuildRunner,
};
use jupgrade_orchestrator::{OrchestratorSettings, UpgradeOrchestrator, UpgradeServices};

use crate::cli::Cli;
use crate::cli::output::{OutputWriter, ProgressIndicator};

/// Context shared by every command
pub struct CliContext {
    /// Configuration for the working directory
    pub config: Arc<Config>,

    /// Output writer configured based on CLI flags
    pub output: OutputWriter,

    /// Whether we're running in CI mode
    pub ci_mode: bool,

    /// Directory relative paths are resolved against
    pub working_dir: PathBuf,

    /// Tripped on Ctrl-C
    pub cancel: CancellationToken,

    explicit_config: Option<PathBuf>,
    quiet: bool,
}

impl CliContext {
    /// Create a new CLI context from parsed CLI arguments
    pub fn new(cli: &Cli) -> Result<Self> {
        let working_dir =
            std::env::current_dir().context("Failed to determine current working directory")?;

        let config = Config::load_for_workspace(&working_dir, cli.config.as_deref())
            .context("Failed to load configuration")?;

        jupgrade_core::init_tracing(&Self::logging_config(cli, &config.logging))?;
        tracing::debug!(dir = %working_dir.display(), "CLI context ready");

        Ok(Self {
            config: Arc::new(config),
            output: OutputWriter::new(cli.format, cli.quiet, cli.verbose),
            ci_mode: cli.ci,
            working_dir,
            cancel: CancellationToken::new(),
            explicit_config: cli.config.clone(),
            quiet: cli.quiet,
        })
    }

    /// `--verbose` and `--quiet` override the configured level
    fn logging_config(cli: &Cli, configured: &LoggingConfig) -> LoggingConfig {
        let mut logging = configured.clone();
        if cli.verbose {
            logging.level = "debug".to_string();
        } else if cli.quiet {
            logging.level = "error".to_string();
        }
        logging
    }

    /// Absolute form of a command's PATH argument
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    /// Configuration including the project's own `.jupgrade.toml`
    pub fn project_config(&self, root: &Path) -> Result<Config, ConfigLoadError> {
        if root == self.working_dir {
            return Ok((*self.config).clone());
        }
        Config::load_for_workspace(root, self.explicit_config.as_deref())
    }

    /// Spinner unless quiet or in CI
    pub fn spinner(&self, message: &str) -> Option<ProgressIndicator> {
        (!self.quiet && !self.ci_mode).then(|| ProgressIndicator::spinner(message))
    }

    pub fn state_store(&self, config: &Config) -> Result<Arc<dyn StateStore>, UpgradeError> {
        let store = match &config.state.path {
            Some(path) => FileStateStore::new(path),
            None => FileStateStore::at_default_location()?,
        };
        Ok(Arc::new(store))
    }

    pub fn history(&self, config: &Config) -> Result<HistoryService, UpgradeError> {
        Ok(HistoryService::new(
            self.state_store(config)?,
            config.state.max_history_entries,
        ))
    }

    pub fn planner(&self, config: &Config) -> Result<UpgradePlanner, UpgradeError> {
        let registry = MavenCentralClient::new(&config.apis.maven_central)?;
        let resolver = DependencyResolver::new(Arc::new(registry));
        Ok(UpgradePlanner::new(Arc::new(resolver), config.upgrade.clone()))
    }

    pub fn restore_service(&self, config: &Config) -> RestoreService {
        RestoreService::new(
            Arc::new(GitVersionControl::new()),
            Arc::new(FileBackupStore::new()),
            config.git.tag_prefix.clone(),
        )
    }

    /// Wire the orchestrator with the production collaborators
    pub async fn orchestrator(
        &self,
        config: &Config,
        confirmation: Arc<dyn PlanConfirmation>,
        progress: Arc<dyn ProgressReporter>,
    ) -> Result<UpgradeOrchestrator, UpgradeError> {
        let history = self.history(config)?;
        let ignored = history.state().await?.ignored_warnings;

        let nvd = NvdClient::new(&config.apis.nvd)?;
        let scanner = NvdVulnerabilityScanner::new(Arc::new(nvd), &config.security)?
            .with_ignored(ignored);
        let validation = ValidationStage::new(
            Arc::new(ProcessBuildRunner::new(config.build.clone())),
            Arc::new(scanner),
            &config.upgrade,
            &config.security,
        );

        let services = UpgradeServices {
            analyzer: ProjectAnalyzer::new(config.upgrade.build_tool),
            planner: self.planner(config)?,
            dependencies: DependencyManager::new(),
            recipes: Arc::new(OpenRewriteRunner::new(
                config.openrewrite.clone(),
                &config.build,
            )),
            validation,
            version_control: Arc::new(GitVersionControl::new()),
            backups: Arc::new(FileBackupStore::new()),
            history,
            reports: Arc::new(FileReportService::new()),
            confirmation,
            progress,
        };

        Ok(UpgradeOrchestrator::new(
            services,
            OrchestratorSettings::from(config),
        ))
    }
}
