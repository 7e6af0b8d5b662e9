//! Plan Command - Show the upgrade plan without touching the project

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use jupgrade_orchestrator::application::ProjectAnalyzer;

use super::{PlanView, TargetArgs, load_project_config, print_plan};
use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;
use crate::cli::{Cli, exit_code_for, exit_codes};

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Path to the project directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    #[command(flatten)]
    pub targets: TargetArgs,
}

/// Run the plan command
pub async fn run(ctx: &CliContext, _cli: &Cli, args: &PlanArgs) -> Result<i32> {
    let root = ctx.resolve_path(&args.path);
    let config = match load_project_config(ctx, &root, &args.targets) {
        Ok(config) => config,
        Err(e) => {
            ctx.output.error(&format!("Invalid configuration: {:#}", e));
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let spinner = ctx.spinner("Analyzing project...");
    let planned = async {
        let project = ProjectAnalyzer::new(config.upgrade.build_tool)
            .analyze_project(&root)
            .await?;
        if let Some(s) = &spinner {
            s.set_message("Resolving latest dependency versions...");
        }
        let plan = ctx.planner(&config)?.generate_plan(&project).await;
        Ok::<_, jupgrade_core::application::errors::UpgradeError>((project, plan))
    }
    .await;
    if let Some(s) = &spinner {
        s.finish_and_clear();
    }

    let (project, plan) = match planned {
        Ok(planned) => planned,
        Err(e) => {
            ctx.output.error(&e.to_string());
            return Ok(exit_code_for(&e));
        }
    };

    match ctx.output.format() {
        OutputFormat::Json => ctx.output.json(&PlanView::new(&project, &plan))?,
        OutputFormat::Table => print_plan(&ctx.output, &project, &plan),
    }

    Ok(exit_codes::SUCCESS)
}
