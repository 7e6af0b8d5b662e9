//! Upgrade Command - Analyze, plan, confirm, apply and validate
//!
//! Drives [`UpgradeOrchestrator`] with an interactive confirmation. In CI mode
//! nothing is prompted: plans are applied only when `--yes` is given.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use serde::Serialize;

use jupgrade_core::domain::project::ProjectInfo;
use jupgrade_core::domain::upgrade::{UpgradePlan, UpgradeStatus};
use jupgrade_orchestrator::domain::PlanConfirmation;
use jupgrade_orchestrator::{PlanDecision, UpgradeOptions, UpgradeOutcome, UpgradeSummary};

use super::{PlanView, TargetArgs, load_project_config, print_plan};
use crate::cli::context::CliContext;
use crate::cli::output::{OutputFormat, OutputWriter, ProgressIndicator, SpinnerProgress, confirm};
use crate::cli::{Cli, exit_code_for, exit_codes, workflow_exit_code};

/// Arguments for the upgrade command
#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Path to the project directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Apply the plan without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Stop after planning; nothing is changed
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub targets: TargetArgs,
}

/// Shows the plan and asks before anything is changed
struct PromptConfirmation {
    output: OutputWriter,
    indicator: Option<ProgressIndicator>,
    assume_yes: bool,
    ci: bool,
}

#[async_trait]
impl PlanConfirmation for PromptConfirmation {
    async fn confirm(&self, project: &ProjectInfo, plan: &UpgradePlan) -> PlanDecision {
        if self.assume_yes {
            return PlanDecision::Approved;
        }
        if self.ci {
            self.output
                .warn("CI mode: plan not applied without --yes");
            return PlanDecision::Rejected;
        }

        let output = self.output.clone();
        let indicator = self.indicator.clone();
        let project = project.clone();
        let plan = plan.clone();
        let answer = tokio::task::spawn_blocking(move || {
            let ask = || {
                print_plan(&output, &project, &plan);
                confirm("Apply this upgrade?", false, false)
            };
            match indicator {
                Some(indicator) => indicator.suspend(ask),
                None => ask(),
            }
        })
        .await;

        match answer {
            Ok(Ok(true)) => PlanDecision::Approved,
            Ok(Ok(false)) => PlanDecision::Rejected,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Prompt failed; treating as rejection");
                PlanDecision::Rejected
            }
            Err(e) => {
                tracing::warn!(error = %e, "Prompt task failed; treating as rejection");
                PlanDecision::Rejected
            }
        }
    }
}

/// Summary of a finished run for JSON output
#[derive(Debug, Serialize)]
struct RunView<'a> {
    history_id: String,
    status: UpgradeStatus,
    #[serde(flatten)]
    plan: PlanView<'a>,
    result: &'a jupgrade_core::domain::upgrade::UpgradeResult,
    checkpoints: &'a [String],
    backup_id: Option<&'a str>,
    report_paths: &'a [PathBuf],
}

impl<'a> RunView<'a> {
    fn new(summary: &'a UpgradeSummary) -> Self {
        Self {
            history_id: summary.history_id.to_string(),
            status: summary.status,
            plan: PlanView::new(&summary.project, &summary.plan),
            result: &summary.result,
            checkpoints: &summary.checkpoints,
            backup_id: summary.backup_id.as_deref(),
            report_paths: &summary.report_paths,
        }
    }
}

/// Run the upgrade command
pub async fn run(ctx: &CliContext, cli: &Cli, args: &UpgradeArgs) -> Result<i32> {
    let root = ctx.resolve_path(&args.path);
    let config = match load_project_config(ctx, &root, &args.targets) {
        Ok(config) => config,
        Err(e) => {
            ctx.output.error(&format!("Invalid configuration: {:#}", e));
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let indicator = ctx.spinner("Starting upgrade...");
    let progress = Arc::new(SpinnerProgress::new(indicator.clone(), ctx.output.clone()));
    let confirmation = Arc::new(PromptConfirmation {
        output: ctx.output.clone(),
        indicator,
        assume_yes: args.yes,
        ci: cli.ci,
    });

    let orchestrator = match ctx.orchestrator(&config, confirmation, progress.clone()).await {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            progress.finish();
            ctx.output.error(&e.to_string());
            return Ok(exit_code_for(&e));
        }
    };

    let options = UpgradeOptions {
        dry_run: args.dry_run,
    };
    let outcome = orchestrator.run(&root, &options, &ctx.cancel).await;
    progress.finish();

    match outcome {
        Ok(UpgradeOutcome::DryRun { project, plan }) => {
            match ctx.output.format() {
                OutputFormat::Json => ctx.output.json(&PlanView::new(&project, &plan))?,
                OutputFormat::Table => {
                    print_plan(&ctx.output, &project, &plan);
                    ctx.output.info("Dry run: no changes were made");
                }
            }
            Ok(exit_codes::SUCCESS)
        }
        Ok(UpgradeOutcome::Rejected { project, plan }) => {
            if ctx.output.format() == OutputFormat::Json {
                ctx.output.json(&PlanView::new(&project, &plan))?;
            }
            ctx.output.info("Upgrade not applied");
            Ok(exit_codes::REJECTED)
        }
        Ok(UpgradeOutcome::Finished(summary)) => {
            match ctx.output.format() {
                OutputFormat::Json => ctx.output.json(&RunView::new(&summary))?,
                OutputFormat::Table => print_summary(&ctx.output, &summary),
            }
            if summary.status == UpgradeStatus::Completed {
                ctx.output.success(&format!(
                    "Upgraded to Java {}",
                    summary.plan.target_java_version()
                ));
                Ok(exit_codes::SUCCESS)
            } else {
                ctx.output.error("Upgrade applied but validation failed");
                if let Some(before) = summary.checkpoints.first() {
                    ctx.output.info(&format!(
                        "Roll back with: jupgrade restore --checkpoint {}",
                        before
                    ));
                } else if let Some(backup) = &summary.backup_id {
                    ctx.output
                        .info(&format!("Roll back with: jupgrade restore --backup {}", backup));
                }
                Ok(exit_codes::UPGRADE_FAILED)
            }
        }
        Err(e) => {
            if e.is_cancelled() {
                ctx.output.warn("Upgrade cancelled");
            } else {
                ctx.output.error(&e.to_string());
            }
            Ok(workflow_exit_code(&e))
        }
    }
}

fn print_summary(output: &OutputWriter, summary: &UpgradeSummary) {
    print_plan(output, &summary.project, &summary.plan);

    output.header("Validation");
    output.validation(&summary.result);

    output.header("Vulnerabilities");
    output.vulnerabilities(&summary.result.vulnerability_issues);

    if !summary.result.changed_files.is_empty() {
        output.header(&format!(
            "Changed files ({})",
            summary.result.changed_files.len()
        ));
        for file in &summary.result.changed_files {
            output.print(&format!("  {}", file.display()));
        }
    }

    if !summary.checkpoints.is_empty() {
        output.header("Checkpoints");
        for tag in &summary.checkpoints {
            output.print(&format!("  {}", tag));
        }
    }
    if let Some(backup) = &summary.backup_id {
        output.print(&format!("\n  Backup: {}", backup));
    }
    for path in &summary.report_paths {
        output.print(&format!("  Report: {}", path.display()));
    }
}
