//! Output formatting, progress spinners and prompts

use std::time::Duration;

use anyhow::Result;
use clap::ValueEnum;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use jupgrade_core::domain::upgrade::UpgradeResult;
use jupgrade_core::domain::vulnerability::{Severity, VulnerabilityIssue};
use jupgrade_orchestrator::domain::{ProgressReporter, ProgressStep};

/// Output format for command results
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables (default)
    #[default]
    Table,
    /// JSON on stdout for machine processing
    Json,
}

/// Writes command output according to the global flags
#[derive(Debug, Clone)]
pub struct OutputWriter {
    format: OutputFormat,
    quiet: bool,
    verbose: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, quiet: bool, verbose: bool) -> Self {
        Self {
            format,
            quiet,
            verbose,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Table output goes to stdout unless quiet; JSON mode keeps stdout for `json`
    fn human(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Table
    }

    pub fn header(&self, title: &str) {
        if self.human() {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    pub fn print(&self, line: &str) {
        if self.human() {
            println!("{}", line);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("•").cyan(), message);
        }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("✓").green().bold(), message);
        }
    }

    pub fn warn(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("!").yellow().bold(), style(message).yellow());
        }
    }

    /// Errors are shown even in quiet mode
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red().bold(), style(message).red());
    }

    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub fn vulnerabilities(&self, issues: &[VulnerabilityIssue]) {
        if issues.is_empty() {
            self.print("  No known vulnerabilities");
            return;
        }
        for issue in issues {
            self.print(&format!(
                "  {:<10} {:<20} {}",
                severity_label(issue.severity),
                issue.id,
                issue.dependency
            ));
        }
    }

    pub fn validation(&self, result: &UpgradeResult) {
        self.print(&format!("  Build:  {}", pass_fail(result.build_success)));
        if result.tests_skipped {
            self.print(&format!("  Tests:  {}", style("skipped").dim()));
        } else {
            self.print(&format!("  Tests:  {}", pass_fail(result.tests_passing)));
        }
    }
}

fn pass_fail(ok: bool) -> String {
    if ok {
        style("passed").green().to_string()
    } else {
        style("failed").red().to_string()
    }
}

fn severity_label(severity: Severity) -> String {
    let label = severity.to_string();
    match severity {
        Severity::Critical => style(label).red().bold().to_string(),
        Severity::High => style(label).red().to_string(),
        Severity::Medium => style(label).yellow().to_string(),
        Severity::Low => style(label).dim().to_string(),
    }
}

/// Spinner shown while a long operation runs
#[derive(Clone)]
pub struct ProgressIndicator {
    bar: ProgressBar,
}

impl ProgressIndicator {
    pub fn spinner(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message(message.to_string());
        Self { bar }
    }

    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    pub fn println(&self, line: &str) {
        self.bar.println(line);
    }

    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }

    /// Hide the spinner while `f` writes to the terminal
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }
}

/// Feeds orchestrator progress into a spinner, or nowhere when there is none
pub struct SpinnerProgress {
    indicator: Option<ProgressIndicator>,
    output: OutputWriter,
}

impl SpinnerProgress {
    pub fn new(indicator: Option<ProgressIndicator>, output: OutputWriter) -> Self {
        Self { indicator, output }
    }

    pub fn finish(&self) {
        if let Some(indicator) = &self.indicator {
            indicator.finish_and_clear();
        }
    }
}

impl ProgressReporter for SpinnerProgress {
    fn step(&self, step: &ProgressStep) {
        tracing::debug!(step = %step, "Upgrade progress");
        match &self.indicator {
            Some(indicator) => indicator.set_message(&step.to_string()),
            None if self.output.is_verbose() => self.output.info(&step.to_string()),
            None => {}
        }
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
        match &self.indicator {
            Some(indicator) => indicator.println(&format!("{} {}", style("!").yellow(), message)),
            None => self.output.warn(message),
        }
    }

    fn finished(&self, _result: &UpgradeResult) {
        self.finish();
    }
}

/// Yes/no prompt; CI mode never prompts and answers `default`
pub fn confirm(prompt: &str, default: bool, ci: bool) -> Result<bool> {
    if ci {
        return Ok(default);
    }
    let answer = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?;
    Ok(answer)
}
