//! Manual restore from checkpoints and backups

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use jupgrade_core::application::errors::UpgradeError;

use crate::domain::services::{BackupStore, VersionControl};

/// Restore points available for a project
#[derive(Debug, Clone, Default, Serialize)]
pub struct RestorePoints {
    pub checkpoints: Vec<String>,
    pub backups: Vec<String>,
}

pub struct RestoreService {
    version_control: Arc<dyn VersionControl>,
    backups: Arc<dyn BackupStore>,
    tag_prefix: String,
}

impl RestoreService {
    pub fn new(
        version_control: Arc<dyn VersionControl>,
        backups: Arc<dyn BackupStore>,
        tag_prefix: impl Into<String>,
    ) -> Self {
        Self {
            version_control,
            backups,
            tag_prefix: tag_prefix.into(),
        }
    }

    pub async fn list(&self, root: &Path) -> Result<RestorePoints, UpgradeError> {
        let checkpoints = if self.version_control.is_repository(root).await {
            self.version_control
                .list_tags(root, &self.tag_prefix)
                .await?
        } else {
            Vec::new()
        };
        let backups = self.backups.list(root).await?;
        Ok(RestorePoints {
            checkpoints,
            backups,
        })
    }

    /// Hard-reset the work tree to a checkpoint tag
    #[instrument(skip(self), fields(root = %root.display()))]
    pub async fn restore_checkpoint(&self, root: &Path, tag: &str) -> Result<(), UpgradeError> {
        if !self.version_control.is_repository(root).await {
            return Err(UpgradeError::git(
                "restore",
                format!("{} is not a git repository", root.display()),
            ));
        }
        if !tag.starts_with(&self.tag_prefix) {
            return Err(UpgradeError::git(
                "restore",
                format!("{} is not a jupgrade checkpoint", tag),
            ));
        }
        self.version_control.reset_to(root, tag).await?;
        info!(tag, "Restored checkpoint");
        Ok(())
    }

    /// Copy a backup back over the project. Files added since the backup stay.
    #[instrument(skip(self), fields(root = %root.display()))]
    pub async fn restore_backup(
        &self,
        root: &Path,
        backup_id: &str,
    ) -> Result<Vec<PathBuf>, UpgradeError> {
        let restored = self.backups.restore(root, backup_id).await?;
        info!(backup_id, files = restored.len(), "Restored backup");
        Ok(restored)
    }
}
