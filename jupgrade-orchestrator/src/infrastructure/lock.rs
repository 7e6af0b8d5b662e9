//! Exclusive per-project run lock

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use jupgrade_core::application::errors::UpgradeError;

/// Lock file path relative to the project root
pub const LOCK_FILE: &str = ".jupgrade/upgrade.lock";

/// Held for the duration of an upgrade run; removes the lock file on drop
#[derive(Debug)]
pub struct UpgradeLock {
    path: PathBuf,
}

impl UpgradeLock {
    /// Create the lock file, failing with `UpgradeInProgress` if it exists
    pub fn acquire(root: &Path) -> Result<Self, UpgradeError> {
        let path = root.join(LOCK_FILE);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(UpgradeError::UpgradeInProgress { lock_path: path });
            }
            Err(e) => return Err(e.into()),
        };

        writeln!(
            file,
            "pid={}\nstarted={}",
            std::process::id(),
            chrono::Utc::now().to_rfc3339()
        )?;
        debug!(path = %path.display(), "Acquired upgrade lock");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UpgradeLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to release upgrade lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_until_released() {
        let dir = tempfile::tempdir().unwrap();
        let first = UpgradeLock::acquire(dir.path()).unwrap();

        let err = UpgradeLock::acquire(dir.path()).unwrap_err();
        assert!(matches!(err, UpgradeError::UpgradeInProgress { .. }));

        drop(first);
        assert!(!dir.path().join(LOCK_FILE).exists());
        assert!(UpgradeLock::acquire(dir.path()).is_ok());
    }
}
