//! Analyze Command - Show what a project declares
//!
//! Detects the build tool, the Java and Spring Boot versions in use and the
//! declared dependencies, and flags artifacts declared with conflicting versions.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use jupgrade_core::domain::project::ProjectInfo;
use jupgrade_core::domain::upgrade::Conflict;
use jupgrade_orchestrator::application::ProjectAnalyzer;

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;
use crate::cli::{Cli, exit_code_for, exit_codes};

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to the project directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Exit with an error when conflicting versions are declared
    #[arg(long)]
    pub fail_on_conflict: bool,
}

/// Analysis result for JSON output
#[derive(Debug, Serialize)]
pub struct AnalysisResult {
    pub project: ProjectInfo,
    pub conflicts: Vec<Conflict>,
}

/// Run the analyze command
pub async fn run(ctx: &CliContext, _cli: &Cli, args: &AnalyzeArgs) -> Result<i32> {
    let root = ctx.resolve_path(&args.path);
    let config = match ctx.project_config(&root) {
        Ok(config) => config,
        Err(e) => {
            ctx.output.error(&format!("Invalid configuration: {}", e));
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let spinner = ctx.spinner("Analyzing project...");
    let analyzed = ProjectAnalyzer::new(config.upgrade.build_tool)
        .analyze_project(&root)
        .await;
    if let Some(s) = &spinner {
        s.finish_and_clear();
    }

    let project = match analyzed {
        Ok(project) => project,
        Err(e) => {
            ctx.output.error(&e.to_string());
            return Ok(exit_code_for(&e));
        }
    };
    let conflicts = jupgrade_deps::check_conflicts(&project.dependencies);

    match ctx.output.format() {
        OutputFormat::Json => ctx.output.json(&AnalysisResult {
            project: project.clone(),
            conflicts: conflicts.clone(),
        })?,
        OutputFormat::Table => print_analysis(ctx, &project, &conflicts),
    }

    if args.fail_on_conflict && !conflicts.is_empty() {
        return Ok(exit_codes::UPGRADE_FAILED);
    }
    Ok(exit_codes::SUCCESS)
}

fn print_analysis(ctx: &CliContext, project: &ProjectInfo, conflicts: &[Conflict]) {
    ctx.output.header("Project");
    ctx.output
        .print(&format!("  Root:        {}", project.root.display()));
    ctx.output.print(&format!(
        "  Build tool:  {} ({})",
        project.build_system,
        project.manifest_path.display()
    ));
    ctx.output
        .print(&format!("  Java:        {}", project.current_java_version));
    if let Some(boot) = &project.framework_version {
        ctx.output.print(&format!("  Spring Boot: {}", boot));
    }

    ctx.output.header(&format!(
        "Dependencies ({})",
        project.dependencies.len()
    ));
    for dependency in &project.dependencies {
        let version = if dependency.has_resolved_version() {
            dependency.version.as_str()
        } else {
            "(managed)"
        };
        ctx.output
            .print(&format!("  {:<55} {}", dependency.key(), version));
    }

    if !conflicts.is_empty() {
        ctx.output.warn(&format!(
            "{} artifact(s) declared with conflicting versions",
            conflicts.len()
        ));
        for conflict in conflicts {
            ctx.output.print(&format!(
                "  {:<55} {}",
                conflict.key,
                conflict.versions.join(", ")
            ));
        }
    }
}
