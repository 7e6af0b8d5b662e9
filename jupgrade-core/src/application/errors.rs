//! Application error types
//!
//! Each infrastructure layer owns its own error enum; [`UpgradeError`] is the
//! taxonomy surfaced by the upgrade workflow and wraps the layer errors with
//! their original messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::infrastructure::api_clients::NvdError;
use crate::infrastructure::manifest::ManifestError;
use crate::infrastructure::process::ProcessError;
use crate::infrastructure::registries::RegistryError;
use crate::infrastructure::state::StateError;

/// Manifest parsing errors
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("XML parse error at byte {position}: {message}")]
    Xml { position: usize, message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by the upgrade workflow
#[derive(Error, Debug)]
pub enum UpgradeError {
    #[error("No pom.xml, build.gradle or build.gradle.kts found in {path}")]
    BuildSystemNotFound { path: PathBuf },

    #[error("Manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    #[error("Recipe {recipe} failed: {cause}")]
    RecipeApplicationFailure { recipe: String, cause: String },

    #[error("Failed to update dependency {coordinate}: {cause}")]
    DependencyUpdateFailure { coordinate: String, cause: String },

    #[error("Git {operation} failed: {message}")]
    GitOperationFailure { operation: String, message: String },

    #[error("Another upgrade is already running (lock file {lock_path})")]
    UpgradeInProgress { lock_path: PathBuf },

    #[error("Upgrade cancelled")]
    Cancelled,

    #[error("Manifest parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Manifest update error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Vulnerability API error: {0}")]
    Vulnerability(#[from] NvdError),

    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Backup error: {message}")]
    Backup { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl UpgradeError {
    pub fn recipe_failure(recipe: impl Into<String>, cause: impl ToString) -> Self {
        Self::RecipeApplicationFailure {
            recipe: recipe.into(),
            cause: cause.to_string(),
        }
    }

    pub fn git(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::GitOperationFailure {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn backup(message: impl ToString) -> Self {
        Self::Backup {
            message: message.to_string(),
        }
    }

    pub fn config(message: impl ToString) -> Self {
        Self::Config {
            message: message.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            UpgradeError::Cancelled | UpgradeError::Process(ProcessError::Cancelled { .. })
        )
    }

    /// Whether the failure came from talking to a remote service
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            UpgradeError::Registry(RegistryError::Http { .. })
                | UpgradeError::Registry(RegistryError::RateLimited)
                | UpgradeError::Vulnerability(NvdError::Http { .. })
                | UpgradeError::Vulnerability(NvdError::RateLimited)
        )
    }
}
