//! CLI Commands Module
//!
//! This module contains all CLI subcommand implementations.

pub mod analyze;
pub mod config;
pub mod history;
pub mod plan;
pub mod restore;
pub mod state;
pub mod upgrade;

use std::path::Path;

use clap::Args;
use serde::Serialize;

use jupgrade_core::config::{Config, Validate};
use jupgrade_core::domain::project::ProjectInfo;
use jupgrade_core::domain::upgrade::{DependencyUpdate, UpgradePlan};

use crate::cli::context::CliContext;
use crate::cli::output::OutputWriter;

/// Target version overrides shared by `plan` and `upgrade`
#[derive(Args, Debug, Default)]
pub struct TargetArgs {
    /// Override the target Java version
    #[arg(long)]
    pub java: Option<String>,

    /// Override the target Spring Boot version
    #[arg(long)]
    pub spring_boot: Option<String>,

    /// Skip running the test suite during validation
    #[arg(long)]
    pub skip_tests: bool,
}

/// Project configuration with command-line overrides applied and re-validated
pub fn load_project_config(
    ctx: &CliContext,
    root: &Path,
    targets: &TargetArgs,
) -> anyhow::Result<Config> {
    let mut config = ctx.project_config(root)?;
    if let Some(java) = &targets.java {
        config.upgrade.target_java_version = java.clone();
    }
    if let Some(boot) = &targets.spring_boot {
        config.upgrade.target_framework_version = Some(boot.clone());
    }
    if targets.skip_tests {
        config.upgrade.skip_tests = true;
    }
    config.validate()?;
    Ok(config)
}

/// Plan as shown to users and emitted in JSON mode
#[derive(Debug, Serialize)]
pub struct PlanView<'a> {
    pub project: &'a std::path::Path,
    pub build_tool: String,
    pub current_java_version: &'a str,
    pub target_java_version: &'a str,
    pub current_framework_version: Option<&'a str>,
    pub target_framework_version: Option<&'a str>,
    pub enable_preview_features: bool,
    pub recipes: &'a [String],
    pub dependency_updates: &'a [DependencyUpdate],
}

impl<'a> PlanView<'a> {
    pub fn new(project: &'a ProjectInfo, plan: &'a UpgradePlan) -> Self {
        Self {
            project: &project.root,
            build_tool: project.build_system.to_string(),
            current_java_version: &project.current_java_version,
            target_java_version: plan.target_java_version(),
            current_framework_version: project.framework_version.as_deref(),
            target_framework_version: plan.target_framework_version(),
            enable_preview_features: plan.enable_preview_features(),
            recipes: plan.recipes(),
            dependency_updates: plan.dependency_updates(),
        }
    }
}

/// Table rendering of a plan
pub fn print_plan(output: &OutputWriter, project: &ProjectInfo, plan: &UpgradePlan) {
    output.header("Upgrade Plan");
    output.print(&format!(
        "  Java:        {} -> {}",
        project.current_java_version,
        plan.target_java_version()
    ));
    if let (Some(from), Some(to)) = (&project.framework_version, plan.target_framework_version())
    {
        output.print(&format!("  Spring Boot: {} -> {}", from, to));
    }
    if plan.enable_preview_features() {
        output.print("  Preview features enabled");
    }

    output.print("\n  Recipes:");
    for (i, recipe) in plan.recipes().iter().enumerate() {
        output.print(&format!("    {}. {}", i + 1, recipe));
    }

    if plan.dependency_updates().is_empty() {
        output.print("\n  No dependency updates");
    } else {
        output.print("\n  Dependency updates:");
        for update in plan.dependency_updates() {
            output.print(&format!(
                "    {:<50} {} -> {}",
                update.key(),
                update.from_version,
                update.to_version
            ));
        }
    }
}
