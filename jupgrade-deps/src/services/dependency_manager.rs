//! Writes planned dependency updates into the project's manifest

use std::path::PathBuf;
use tracing::{info, instrument};

use jupgrade_core::application::errors::UpgradeError;
use jupgrade_core::domain::project::ProjectInfo;
use jupgrade_core::domain::upgrade::DependencyUpdate;
use jupgrade_core::infrastructure::manifest::rewrite_dependency_version;

/// Applies version changes to manifest files
pub struct DependencyManager;

impl DependencyManager {
    pub fn new() -> Self {
        Self
    }

    /// Rewrite every update into the manifest and return the files changed.
    ///
    /// Stops at the first update that cannot be applied; nothing is written in
    /// that case.
    #[instrument(skip(self, project, updates), fields(manifest = %project.manifest_path.display(), count = updates.len()))]
    pub async fn apply_updates(
        &self,
        project: &ProjectInfo,
        updates: &[DependencyUpdate],
    ) -> Result<Vec<PathBuf>, UpgradeError> {
        if updates.is_empty() {
            return Ok(Vec::new());
        }

        let path = &project.manifest_path;
        let original = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                UpgradeError::ManifestNotFound { path: path.clone() }
            } else {
                UpgradeError::Io(e)
            }
        })?;

        let mut content = original.clone();
        for update in updates {
            content = rewrite_dependency_version(
                project.build_system,
                &content,
                &update.coordinate.group_id,
                &update.coordinate.artifact_id,
                &update.to_version,
            )
            .map_err(|e| UpgradeError::DependencyUpdateFailure {
                coordinate: update.coordinate.to_string(),
                cause: e.to_string(),
            })?;
            info!(dependency = %update.key(), from = %update.from_version, to = %update.to_version, "Updated dependency");
        }

        if content == original {
            return Ok(Vec::new());
        }

        tokio::fs::write(path, content).await?;
        Ok(vec![path.clone()])
    }
}

impl Default for DependencyManager {
    fn default() -> Self {
        Self::new()
    }
}
