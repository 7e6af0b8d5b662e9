//! Cancellable child process execution
//!
//! Every external tool (Maven, Gradle, OpenRewrite) runs through
//! [`run_command`], which enforces a timeout and kills the child when the
//! cancellation token fires.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Errors that can occur while running an external command
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {seconds} seconds")]
    Timeout { program: String, seconds: u64 },

    #[error("{program} was cancelled")]
    Cancelled { program: String },

    #[error("{program} exited with status {code:?}: {stderr_tail}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr_tail: String,
    },
}

/// A command to run
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub timeout: Duration,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>, working_dir: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.as_ref().to_path_buf(),
            timeout: Duration::from_secs(1800),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn display_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.display().to_string())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Last lines of combined output, for error messages
    pub fn tail(&self, lines: usize) -> String {
        let source = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        let collected: Vec<&str> = source.lines().rev().take(lines).collect();
        collected.into_iter().rev().collect::<Vec<_>>().join("\n")
    }

    /// Turn a non-zero exit into [`ProcessError::Failed`]
    pub fn into_result(self, program: &str) -> Result<CommandOutput, ProcessError> {
        if self.success {
            Ok(self)
        } else {
            Err(ProcessError::Failed {
                program: program.to_string(),
                code: self.code,
                stderr_tail: self.tail(20),
            })
        }
    }
}

/// Run a command to completion.
///
/// A non-zero exit is not an error here; callers decide what failure means.
/// Timeout and cancellation both kill the child.
#[instrument(skip(spec, cancel), fields(program = %spec.display_name()))]
pub async fn run_command(
    spec: &CommandSpec,
    cancel: &CancellationToken,
) -> Result<CommandOutput, ProcessError> {
    let program = spec.display_name();
    if cancel.is_cancelled() {
        return Err(ProcessError::Cancelled { program });
    }

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .current_dir(&spec.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    for (key, value) in &spec.env {
        cmd.env(key, value);
    }

    debug!(args = ?spec.args, dir = %spec.working_dir.display(), "Spawning command");

    let child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: program.clone(),
        source,
    })?;

    // Dropping the output future drops the child, which kills it
    let output = tokio::select! {
        result = child.wait_with_output() => result.map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?,
        _ = tokio::time::sleep(spec.timeout) => {
            warn!(seconds = spec.timeout.as_secs(), "Command timed out");
            return Err(ProcessError::Timeout {
                program,
                seconds: spec.timeout.as_secs(),
            });
        }
        _ = cancel.cancelled() => {
            warn!("Command cancelled");
            return Err(ProcessError::Cancelled { program });
        }
    };

    let result = CommandOutput {
        code: output.status.code(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };

    debug!(code = ?result.code, success = result.success, "Command finished");
    Ok(result)
}
