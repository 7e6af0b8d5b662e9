//! Config Command - Configuration inspection
//!
//! Shows the merged configuration and where it is read from.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use jupgrade_core::config::WORKSPACE_CONFIG_FILE;
use jupgrade_core::infrastructure::state::FileStateStore;

use crate::cli::Cli;
use crate::cli::context::CliContext;
use crate::cli::exit_codes;
use crate::cli::output::OutputFormat;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Show configuration file locations
    Path,
    /// Get a configuration value by dotted key
    Get(GetArgs),
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Configuration key (e.g., "upgrade.target_java_version")
    pub key: String,
}

/// A configuration source in precedence order
#[derive(Debug, Serialize)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub exists: bool,
}

/// Run the config command
pub async fn run(ctx: &CliContext, cli: &Cli, args: &ConfigArgs) -> Result<i32> {
    match &args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Path => show_path(ctx, cli),
        ConfigCommand::Get(get_args) => get_config(ctx, get_args),
    }
}

fn show_config(ctx: &CliContext) -> Result<i32> {
    let config = &ctx.config;
    match ctx.output.format() {
        OutputFormat::Json => ctx.output.json(&**config)?,
        OutputFormat::Table => {
            ctx.output.header("Current Configuration");

            ctx.output.print("\n[Upgrade]");
            ctx.output.print(&format!(
                "  target_java_version: {}",
                config.upgrade.target_java_version
            ));
            ctx.output.print(&format!(
                "  target_framework_version: {}",
                config
                    .upgrade
                    .target_framework_version
                    .as_deref()
                    .unwrap_or("(next known)")
            ));
            ctx.output
                .print(&format!("  build_tool: {}", config.upgrade.build_tool));
            ctx.output
                .print(&format!("  skip_tests: {}", config.upgrade.skip_tests));
            ctx.output.print(&format!(
                "  backup_before_upgrade: {}",
                config.upgrade.backup_before_upgrade
            ));
            if !config.upgrade.custom_recipes.is_empty() {
                ctx.output.print(&format!(
                    "  custom_recipes: {}",
                    config.upgrade.custom_recipes.join(", ")
                ));
            }

            ctx.output.print("\n[Security]");
            ctx.output.print(&format!(
                "  enable_cve_check: {}",
                config.security.enable_cve_check
            ));
            ctx.output.print(&format!(
                "  min_severity_level: {}",
                config.security.min_severity_level
            ));

            ctx.output.print("\n[Git]");
            ctx.output
                .print(&format!("  enabled: {}", config.git.enabled));
            ctx.output
                .print(&format!("  branch_prefix: {}", config.git.branch_prefix));
            ctx.output
                .print(&format!("  tag_prefix: {}", config.git.tag_prefix));

            ctx.output.print("\n[State]");
            ctx.output.print(&format!(
                "  max_history_entries: {}",
                config.state.max_history_entries
            ));
        }
    }

    Ok(exit_codes::SUCCESS)
}

fn show_path(ctx: &CliContext, cli: &Cli) -> Result<i32> {
    let sources: Vec<ConfigSource> = config_paths(ctx, cli)
        .into_iter()
        .map(|path| ConfigSource {
            exists: path.exists(),
            path,
        })
        .collect();
    let state_file = match &ctx.config.state.path {
        Some(path) => Some(path.clone()),
        None => FileStateStore::default_path().ok(),
    };

    match ctx.output.format() {
        OutputFormat::Json => ctx.output.json(&serde_json::json!({
            "sources": sources,
            "state_file": state_file,
        }))?,
        OutputFormat::Table => {
            ctx.output.header("Configuration File Locations");
            ctx.output.print("\nLoad order (later files win):");
            for (i, source) in sources.iter().enumerate() {
                let marker = if source.exists { "✓" } else { " " };
                ctx.output.print(&format!(
                    "  {} {}. {}",
                    marker,
                    i + 1,
                    source.path.display()
                ));
            }

            ctx.output.print("\nEnvironment variables:");
            ctx.output.print("  JUPGRADE__* - Override any config value");
            ctx.output
                .print("  Example: JUPGRADE__UPGRADE__TARGET_JAVA_VERSION=21");

            if let Some(state_file) = state_file {
                ctx.output
                    .print(&format!("\nState file: {}", state_file.display()));
            }
        }
    }

    Ok(exit_codes::SUCCESS)
}

fn get_config(ctx: &CliContext, args: &GetArgs) -> Result<i32> {
    let config_value = serde_json::to_value(&*ctx.config)?;

    let mut current = &config_value;
    for part in args.key.split('.') {
        match current.get(part) {
            Some(v) => current = v,
            None => {
                ctx.output
                    .error(&format!("Configuration key not found: {}", args.key));
                return Ok(exit_codes::CONFIG_ERROR);
            }
        }
    }

    match ctx.output.format() {
        OutputFormat::Json => ctx.output.json(current)?,
        OutputFormat::Table => ctx.output.print(&format!("{} = {}", args.key, current)),
    }

    Ok(exit_codes::SUCCESS)
}

fn config_paths(ctx: &CliContext, cli: &Cli) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("config/default.toml")];
    if let Ok(env) = std::env::var("ENV") {
        paths.push(PathBuf::from(format!("config/{}.toml", env)));
    }
    paths.push(PathBuf::from("config/local.toml"));
    paths.push(ctx.working_dir.join(WORKSPACE_CONFIG_FILE));
    if let Some(explicit) = &cli.config {
        paths.push(explicit.clone());
    }
    paths
}
