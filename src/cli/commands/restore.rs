//! Restore Command - Roll a project back to a checkpoint or backup

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Args};

use crate::cli::context::CliContext;
use crate::cli::output::{OutputFormat, confirm};
use crate::cli::{Cli, exit_code_for, exit_codes};

/// Arguments for the restore command
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["list", "backup", "checkpoint"])))]
pub struct RestoreArgs {
    /// Path to the project directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// List available checkpoints and backups
    #[arg(long)]
    pub list: bool,

    /// Copy the files of a backup back into the project
    #[arg(long, value_name = "ID")]
    pub backup: Option<String>,

    /// Hard-reset the work tree to a checkpoint tag
    #[arg(long, value_name = "TAG")]
    pub checkpoint: Option<String>,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Run the restore command
pub async fn run(ctx: &CliContext, cli: &Cli, args: &RestoreArgs) -> Result<i32> {
    let root = ctx.resolve_path(&args.path);
    let config = match ctx.project_config(&root) {
        Ok(config) => config,
        Err(e) => {
            ctx.output.error(&format!("Invalid configuration: {}", e));
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let service = ctx.restore_service(&config);

    if args.list {
        let points = match service.list(&root).await {
            Ok(points) => points,
            Err(e) => {
                ctx.output.error(&e.to_string());
                return Ok(exit_code_for(&e));
            }
        };
        match ctx.output.format() {
            OutputFormat::Json => ctx.output.json(&points)?,
            OutputFormat::Table => {
                ctx.output.header("Checkpoints");
                if points.checkpoints.is_empty() {
                    ctx.output.print("  (none)");
                }
                for tag in &points.checkpoints {
                    ctx.output.print(&format!("  {}", tag));
                }
                ctx.output.header("Backups");
                if points.backups.is_empty() {
                    ctx.output.print("  (none)");
                }
                for id in &points.backups {
                    ctx.output.print(&format!("  {}", id));
                }
            }
        }
        return Ok(exit_codes::SUCCESS);
    }

    let target = match (&args.checkpoint, &args.backup) {
        (Some(tag), _) => format!("checkpoint {}", tag),
        (None, Some(id)) => format!("backup {}", id),
        (None, None) => return Ok(exit_codes::CONFIG_ERROR),
    };
    if !args.yes {
        if cli.ci {
            ctx.output.error("CI mode: pass --yes to restore");
            return Ok(exit_codes::REJECTED);
        }
        let prompt = format!("Restore {} to {}? Uncommitted changes are lost", root.display(), target);
        if !confirm(&prompt, false, false)? {
            ctx.output.info("Restore cancelled");
            return Ok(exit_codes::REJECTED);
        }
    }

    let restored = match (&args.checkpoint, &args.backup) {
        (Some(tag), _) => service.restore_checkpoint(&root, tag).await.map(|_| None),
        (None, Some(id)) => service.restore_backup(&root, id).await.map(Some),
        (None, None) => return Ok(exit_codes::CONFIG_ERROR),
    };

    match restored {
        Ok(files) => {
            if ctx.output.format() == OutputFormat::Json {
                ctx.output.json(&serde_json::json!({
                    "restored": target,
                    "files": files,
                }))?;
            }
            match files {
                Some(files) => ctx
                    .output
                    .success(&format!("Restored {} file(s) from {}", files.len(), target)),
                None => ctx.output.success(&format!("Restored {}", target)),
            }
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => {
            ctx.output.error(&e.to_string());
            Ok(exit_code_for(&e))
        }
    }
}
