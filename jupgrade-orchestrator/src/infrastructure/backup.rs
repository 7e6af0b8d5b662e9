//! Full-copy project backups under `.jupgrade/backups`

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, instrument};
use walkdir::WalkDir;

use jupgrade_core::application::errors::UpgradeError;

use super::project_detection::is_ignored;
use crate::domain::services::BackupStore;

/// Backup directory relative to the project root
pub const BACKUP_DIR: &str = ".jupgrade/backups";

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Backup {0} does not exist")]
    NotFound(String),
    #[error("Backup task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> BackupError + '_ {
    move |source| BackupError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Project files relative to `root`, skipping hidden and build output directories
fn project_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_ignored(e))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .collect()
}

fn copy_tree(from: &Path, to: &Path, files: &[PathBuf]) -> Result<(), BackupError> {
    for relative in files {
        let target = to.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        std::fs::copy(from.join(relative), &target).map_err(io_error(&target))?;
    }
    Ok(())
}

/// Stores backups inside the project's `.jupgrade` directory
#[derive(Debug, Default)]
pub struct FileBackupStore;

impl FileBackupStore {
    pub fn new() -> Self {
        Self
    }

    fn backup_path(root: &Path, backup_id: &str) -> PathBuf {
        root.join(BACKUP_DIR).join(backup_id)
    }

    fn existing_backup(root: &Path, backup_id: &str) -> Result<PathBuf, BackupError> {
        let path = Self::backup_path(root, backup_id);
        if backup_id.is_empty() || backup_id.contains(['/', '\\']) || !path.is_dir() {
            return Err(BackupError::NotFound(backup_id.to_string()));
        }
        Ok(path)
    }
}

async fn blocking<T, F>(f: F) -> Result<T, UpgradeError>
where
    F: FnOnce() -> Result<T, BackupError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(BackupError::from)
        .and_then(|inner| inner)
        .map_err(UpgradeError::backup)
}

#[async_trait]
impl BackupStore for FileBackupStore {
    #[instrument(skip(self), fields(root = %root.display()))]
    async fn create(&self, root: &Path) -> Result<String, UpgradeError> {
        let root = root.to_path_buf();
        blocking(move || {
            let backup_id = format!(
                "{}-{}",
                chrono::Utc::now().format("%Y%m%dT%H%M%SZ"),
                &uuid::Uuid::new_v4().simple().to_string()[..8]
            );
            let destination = Self::backup_path(&root, &backup_id);
            let files = project_files(&root);
            copy_tree(&root, &destination, &files)?;
            info!(backup_id = %backup_id, files = files.len(), "Created project backup");
            Ok(backup_id)
        })
        .await
    }

    async fn list(&self, root: &Path) -> Result<Vec<String>, UpgradeError> {
        let dir = root.join(BACKUP_DIR);
        blocking(move || {
            if !dir.is_dir() {
                return Ok(Vec::new());
            }
            let mut ids: Vec<String> = std::fs::read_dir(&dir)
                .map_err(io_error(&dir))?
                .filter_map(Result::ok)
                .filter(|e| e.path().is_dir())
                .filter_map(|e| e.file_name().to_str().map(str::to_string))
                .collect();
            ids.sort();
            Ok(ids)
        })
        .await
    }

    #[instrument(skip(self), fields(root = %root.display()))]
    async fn restore(&self, root: &Path, backup_id: &str) -> Result<Vec<PathBuf>, UpgradeError> {
        let root = root.to_path_buf();
        let backup_id = backup_id.to_string();
        blocking(move || {
            let source = Self::existing_backup(&root, &backup_id)?;
            let files = project_files(&source);
            copy_tree(&source, &root, &files)?;
            info!(backup_id = %backup_id, files = files.len(), "Restored project backup");
            Ok(files)
        })
        .await
    }

    async fn changed_files(
        &self,
        root: &Path,
        backup_id: &str,
    ) -> Result<Vec<PathBuf>, UpgradeError> {
        let root = root.to_path_buf();
        let backup_id = backup_id.to_string();
        blocking(move || {
            let backup = Self::existing_backup(&root, &backup_id)?;
            let all: BTreeSet<PathBuf> = project_files(&root)
                .into_iter()
                .chain(project_files(&backup))
                .collect();

            Ok(all
                .into_iter()
                .filter(|relative| {
                    let current = std::fs::read(root.join(relative)).ok();
                    let saved = std::fs::read(backup.join(relative)).ok();
                    current != saved
                })
                .collect())
        })
        .await
    }
}
