//! State Command - Inspect or edit persisted state

use anyhow::Result;
use clap::{Args, Subcommand};

use jupgrade_core::application::errors::UpgradeError;
use jupgrade_core::infrastructure::state::PersistedState;

use crate::cli::context::CliContext;
use crate::cli::output::{OutputFormat, confirm};
use crate::cli::{Cli, exit_code_for, exit_codes};

/// Arguments for the state command
#[derive(Args, Debug)]
pub struct StateArgs {
    #[command(subcommand)]
    pub command: StateCommand,
}

#[derive(Subcommand, Debug)]
pub enum StateCommand {
    /// Show the persisted state
    Show,
    /// Delete history, preferences and ignored warnings
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Stop reporting a vulnerability ID
    Ignore {
        /// Vulnerability ID, e.g. CVE-2021-44228
        id: String,
    },
    /// Store a user preference
    SetPref {
        key: String,
        /// Parsed as JSON when possible, stored as a string otherwise
        value: String,
    },
}

/// Run the state command
pub async fn run(ctx: &CliContext, cli: &Cli, args: &StateArgs) -> Result<i32> {
    let history = match ctx.history(&ctx.config) {
        Ok(history) => history,
        Err(e) => {
            ctx.output.error(&e.to_string());
            return Ok(exit_code_for(&e));
        }
    };

    let result = match &args.command {
        StateCommand::Show => match history.state().await {
            Ok(state) => {
                render_state(ctx, &state)?;
                Ok(())
            }
            Err(e) => Err(e),
        },
        StateCommand::Clear { yes } => {
            if !yes && !confirm("Clear all jupgrade state?", false, cli.ci)? {
                ctx.output.info("State kept");
                return Ok(exit_codes::REJECTED);
            }
            history.clear().await.map(|_| {
                ctx.output.success("State cleared");
            })
        }
        StateCommand::Ignore { id } => history.ignore_warning(id).await.map(|added| {
            if added {
                ctx.output.success(&format!("{} will no longer be reported", id));
            } else {
                ctx.output.info(&format!("{} is already ignored", id));
            }
        }),
        StateCommand::SetPref { key, value } => history
            .set_preference(key, parse_value(value))
            .await
            .map(|_| ctx.output.success(&format!("Set {}", key))),
    };

    match result {
        Ok(()) => Ok(exit_codes::SUCCESS),
        Err(e) => {
            let e = UpgradeError::from(e);
            ctx.output.error(&e.to_string());
            Ok(exit_code_for(&e))
        }
    }
}

fn render_state(ctx: &CliContext, state: &PersistedState) -> Result<()> {
    match ctx.output.format() {
        OutputFormat::Json => ctx.output.json(state)?,
        OutputFormat::Table => {
            ctx.output.header("State");
            ctx.output.print(&format!(
                "  Last upgrade:     {}",
                state
                    .last_upgrade_timestamp
                    .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                    .unwrap_or_else(|| "never".to_string())
            ));
            ctx.output.print(&format!(
                "  History entries:  {}",
                state.upgrade_history.len()
            ));
            ctx.output.print(&format!(
                "  Ignored warnings: {}",
                if state.ignored_warnings.is_empty() {
                    "(none)".to_string()
                } else {
                    state.ignored_warnings.join(", ")
                }
            ));
            if !state.user_preferences.is_empty() {
                ctx.output.print("  Preferences:");
                for (key, value) in &state.user_preferences {
                    ctx.output.print(&format!("    {} = {}", key, value));
                }
            }
        }
    }
    Ok(())
}

fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}
