//! jupgrade CLI - Guided Java upgrades from the command line
//!
//! ## Features
//! - Plans the next LTS Java release, a Spring Boot upgrade and dependency bumps
//! - Applies OpenRewrite recipes and manifest updates with git checkpoints and backups
//! - Validates the result with the project's own build and an NVD scan
//! - CI mode: no prompts, plans are applied only with `--yes`

mod commands;
mod context;
mod output;

use context::CliContext;
use output::OutputFormat;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use jupgrade_core::application::errors::UpgradeError;
use jupgrade_orchestrator::WorkflowError;

/// jupgrade - Upgrade Java projects to the next LTS release
#[derive(Parser, Debug)]
#[command(
    name = "jupgrade",
    version,
    about = "Guided Java language, framework and dependency upgrades",
    long_about = "jupgrade analyzes a Maven or Gradle project, plans an upgrade to the next \
                  long-term-support Java release, applies OpenRewrite recipes and dependency \
                  updates, then validates the result with a build, the test suite and an \
                  NVD vulnerability scan.\n\n\
                  Every run is checkpointed with git tags and an optional backup; use \
                  'jupgrade restore' to roll back."
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// CI mode: disable prompts and spinners; plans need --yes to be applied
    #[arg(long, global = true, env = "JUPGRADE_CI")]
    pub ci: bool,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze, plan and apply an upgrade
    #[command(visible_alias = "u")]
    Upgrade(commands::upgrade::UpgradeArgs),

    /// Generate unit test skeletons for main sources
    GenerateTests(commands::generate_tests::GenerateTestsArgs),

    /// Show what the project declares
    #[command(visible_alias = "a")]
    Analyze(commands::analyze::AnalyzeArgs),

    /// Show the upgrade plan without changing anything
    #[command(visible_alias = "p")]
    Plan(commands::plan::PlanArgs),

    /// Show recorded upgrade runs
    History(commands::history::HistoryArgs),

    /// Roll back to a checkpoint or backup
    Restore(commands::restore::RestoreArgs),

    /// Inspect or edit persisted state
    State(commands::state::StateArgs),

    /// Configuration management
    #[command(visible_alias = "cfg")]
    Config(commands::config::ConfigArgs),
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
    context: CliContext,
}

impl CliApp {
    /// Parse arguments, load configuration and install logging
    pub async fn new() -> anyhow::Result<Self> {
        let cli = Cli::parse();
        let context = CliContext::new(&cli)?;
        Ok(Self { cli, context })
    }

    pub fn cancel_token(&self) -> tokio_util::sync::CancellationToken {
        self.context.cancel.clone()
    }

    /// Run the selected command and return the process exit code
    pub async fn run(self) -> anyhow::Result<i32> {
        let ctx = &self.context;
        let cli = &self.cli;
        let exit_code = match &cli.command {
            Commands::Upgrade(args) => commands::upgrade::run(ctx, cli, args).await,
            Commands::GenerateTests(args) => commands::generate_tests::run(ctx, cli, args).await,
            Commands::Analyze(args) => commands::analyze::run(ctx, cli, args).await,
            Commands::Plan(args) => commands::plan::run(ctx, cli, args).await,
            Commands::History(args) => commands::history::run(ctx, cli, args).await,
            Commands::Restore(args) => commands::restore::run(ctx, cli, args).await,
            Commands::State(args) => commands::state::run(ctx, cli, args).await,
            Commands::Config(args) => commands::config::run(ctx, cli, args).await,
        }?;

        Ok(exit_code)
    }
}

/// Exit codes for CI integration
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// Upgrade applied but the build or tests failed, or a step failed
    pub const UPGRADE_FAILED: i32 = 1;
    /// Configuration or input error
    pub const CONFIG_ERROR: i32 = 2;
    /// Maven Central or NVD unreachable
    pub const NETWORK_ERROR: i32 = 3;
    /// Another upgrade holds the project lock
    pub const IN_PROGRESS: i32 = 4;
    /// Plan rejected or run cancelled
    pub const REJECTED: i32 = 5;
    /// Internal error
    pub const INTERNAL_ERROR: i32 = 99;
}

/// Map an upgrade failure to its exit code
pub fn exit_code_for(error: &UpgradeError) -> i32 {
    if error.is_cancelled() {
        return exit_codes::REJECTED;
    }
    if error.is_network() {
        return exit_codes::NETWORK_ERROR;
    }
    match error {
        UpgradeError::UpgradeInProgress { .. } => exit_codes::IN_PROGRESS,
        UpgradeError::BuildSystemNotFound { .. }
        | UpgradeError::ManifestNotFound { .. }
        | UpgradeError::Parse(_)
        | UpgradeError::Config { .. } => exit_codes::CONFIG_ERROR,
        UpgradeError::RecipeApplicationFailure { .. }
        | UpgradeError::DependencyUpdateFailure { .. }
        | UpgradeError::GitOperationFailure { .. }
        | UpgradeError::Manifest(_)
        | UpgradeError::Process(_) => exit_codes::UPGRADE_FAILED,
        _ => exit_codes::INTERNAL_ERROR,
    }
}

/// Exit code for a workflow failure
pub fn workflow_exit_code(error: &WorkflowError) -> i32 {
    match error {
        WorkflowError::Upgrade(e) => exit_code_for(e),
        WorkflowError::InvalidTransition(_) => exit_codes::INTERNAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            exit_code_for(&UpgradeError::UpgradeInProgress {
                lock_path: "x".into()
            }),
            exit_codes::IN_PROGRESS
        );
        assert_eq!(exit_code_for(&UpgradeError::Cancelled), exit_codes::REJECTED);
        assert_eq!(
            exit_code_for(&UpgradeError::BuildSystemNotFound { path: "x".into() }),
            exit_codes::CONFIG_ERROR
        );
        assert_eq!(
            exit_code_for(&UpgradeError::recipe_failure("r", "boom")),
            exit_codes::UPGRADE_FAILED
        );
        assert_eq!(
            exit_code_for(&UpgradeError::Unknown("?".into())),
            exit_codes::INTERNAL_ERROR
        );
    }
}
