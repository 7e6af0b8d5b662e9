//! JSON file state store

use async_trait::async_trait;
use directories::ProjectDirs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{PersistedState, StateChange, StateError, StateStore};

/// Default state file name inside the data directory
const STATE_FILE_NAME: &str = "state.json";

const LOCK_TIMEOUT: Duration = Duration::from_secs(10);
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(25);
/// Lock files older than this are left over from a crashed process
const STALE_LOCK_AGE: Duration = Duration::from_secs(60);

/// State kept in a JSON file.
///
/// Writers serialize on a sibling `.lock` file and replace the state file
/// through a uniquely named temp file in the same directory.
pub struct FileStateStore {
    path: PathBuf,
    lock_timeout: Duration,
}

impl FileStateStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock_timeout: LOCK_TIMEOUT,
        }
    }

    /// Store at the platform data directory (e.g. `~/.local/share/jupgrade/state.json`)
    pub fn at_default_location() -> Result<Self, StateError> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf, StateError> {
        let dirs = ProjectDirs::from("dev", "jupgrade", "jupgrade").ok_or(StateError::NoDataDir)?;
        Ok(dirs.data_dir().join(STATE_FILE_NAME))
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StateError {
        StateError::Io {
            path: self.path.clone(),
            source,
        }
    }

    async fn lock(&self) -> Result<StateFileLock, StateError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let path = self.path.with_extension("json.lock");
        let deadline = Instant::now() + self.lock_timeout;
        loop {
            let attempt = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            match attempt {
                Ok(_) => {
                    debug!(path = %path.display(), "Acquired state lock");
                    return Ok(StateFileLock { path });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if is_stale(&path) {
                        warn!(path = %path.display(), "Removing stale state lock");
                        let _ = tokio::fs::remove_file(&path).await;
                        continue;
                    }
                    if Instant::now() >= deadline {
                        return Err(StateError::Locked { path });
                    }
                    tokio::time::sleep(LOCK_RETRY_DELAY).await;
                }
                Err(e) => return Err(self.io_error(e)),
            }
        }
    }

    /// Replace the state file; caller holds the lock
    async fn write(&self, state: &PersistedState) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(state)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, json.as_bytes()))
            .await
            .map_err(|e| self.io_error(std::io::Error::other(e)))?
            .map_err(|e| self.io_error(e))?;

        info!(
            path = %self.path.display(),
            history_entries = state.upgrade_history.len(),
            "Saved state"
        );
        Ok(())
    }
}

fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn is_stale(lock: &Path) -> bool {
    std::fs::metadata(lock)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age > STALE_LOCK_AGE)
}

/// Removes the lock file on drop
struct StateFileLock {
    path: PathBuf,
}

impl Drop for StateFileLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to release state lock");
        }
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> Result<PersistedState, StateError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "State file does not exist, using empty state");
                return Ok(PersistedState::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        match serde_json::from_str::<PersistedState>(&content) {
            Ok(state) => Ok(state),
            Err(e) => {
                // Keep the unreadable file aside instead of overwriting it on the next save
                let aside = self.path.with_extension("json.corrupt");
                warn!(
                    path = %self.path.display(),
                    moved_to = %aside.display(),
                    error = %e,
                    "State file is corrupted, starting from empty state"
                );
                tokio::fs::rename(&self.path, &aside)
                    .await
                    .map_err(|e| self.io_error(e))?;
                Ok(PersistedState::default())
            }
        }
    }

    async fn save(&self, state: &PersistedState) -> Result<(), StateError> {
        let _lock = self.lock().await?;
        self.write(state).await
    }

    async fn update(&self, change: StateChange<'_>) -> Result<PersistedState, StateError> {
        let _lock = self.lock().await?;
        let mut state = self.load().await?;
        if change(&mut state) {
            self.write(&state).await?;
        }
        Ok(state)
    }
}
