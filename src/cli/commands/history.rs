//! History Command - Recorded upgrade runs

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use jupgrade_core::domain::upgrade::{UpgradeHistoryEntry, UpgradeStatus};

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;
use crate::cli::{Cli, exit_code_for, exit_codes};

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Show at most this many entries
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
struct HistoryView {
    last_upgrade: Option<chrono::DateTime<chrono::Utc>>,
    entries: Vec<UpgradeHistoryEntry>,
}

/// Run the history command
pub async fn run(ctx: &CliContext, _cli: &Cli, args: &HistoryArgs) -> Result<i32> {
    let loaded = async {
        let history = ctx.history(&ctx.config)?;
        let entries = history.list().await?;
        let last_upgrade = history.last_upgrade().await?;
        Ok::<_, jupgrade_core::application::errors::UpgradeError>((entries, last_upgrade))
    }
    .await;

    let (mut entries, last_upgrade) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            ctx.output.error(&e.to_string());
            return Ok(exit_code_for(&e));
        }
    };
    entries.truncate(args.limit);

    match ctx.output.format() {
        OutputFormat::Json => ctx.output.json(&HistoryView {
            last_upgrade,
            entries,
        })?,
        OutputFormat::Table => {
            if entries.is_empty() {
                ctx.output.info("No upgrades recorded");
                return Ok(exit_codes::SUCCESS);
            }
            ctx.output.header("Upgrade History");
            for entry in &entries {
                ctx.output.print(&format!(
                    "  {}  {:<11} {:<6} {} -> {}  {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    status_label(entry.status),
                    entry.build_tool,
                    entry.from_version,
                    entry.to_version,
                    entry.message.as_deref().unwrap_or("")
                ));
            }
            if let Some(last) = last_upgrade {
                ctx.output.print(&format!(
                    "\n  Last successful upgrade: {}",
                    last.format("%Y-%m-%d %H:%M UTC")
                ));
            }
        }
    }

    Ok(exit_codes::SUCCESS)
}

fn status_label(status: UpgradeStatus) -> String {
    let label = status.to_string();
    match status {
        UpgradeStatus::Completed => console::style(label).green().to_string(),
        UpgradeStatus::Failed => console::style(label).red().to_string(),
        UpgradeStatus::Cancelled => console::style(label).yellow().to_string(),
        UpgradeStatus::InProgress => console::style(label).dim().to_string(),
    }
}
