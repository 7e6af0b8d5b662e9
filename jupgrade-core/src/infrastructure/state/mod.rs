//! Durable state kept between runs
//!
//! A single JSON document with four keys: `lastUpgradeTimestamp`,
//! `upgradeHistory`, `userPreferences` and `ignoredWarnings`.

pub mod file_store;
pub mod memory_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

use crate::domain::upgrade::{UpgradeHistoryEntry, UpgradeStatus};

pub use file_store::FileStateStore;
pub use memory_store::InMemoryStateStore;

/// State persistence errors
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("State file I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Could not determine a data directory for the state file")]
    NoDataDir,

    #[error("Timed out waiting for the state lock at {path}")]
    Locked { path: PathBuf },
}

/// Everything persisted between runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    pub last_upgrade_timestamp: Option<DateTime<Utc>>,
    /// Oldest first
    pub upgrade_history: Vec<UpgradeHistoryEntry>,
    pub user_preferences: BTreeMap<String, serde_json::Value>,
    pub ignored_warnings: Vec<String>,
}

impl PersistedState {
    /// Append an entry, dropping the oldest entries beyond `max_entries`
    pub fn push_history(&mut self, entry: UpgradeHistoryEntry, max_entries: usize) {
        self.upgrade_history.push(entry);
        let max_entries = max_entries.max(1);
        if self.upgrade_history.len() > max_entries {
            let excess = self.upgrade_history.len() - max_entries;
            self.upgrade_history.drain(..excess);
        }
    }

    /// Update the status of a recorded entry; returns false when it is gone
    pub fn finish_history(
        &mut self,
        id: Uuid,
        status: UpgradeStatus,
        message: Option<String>,
    ) -> bool {
        match self.upgrade_history.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.finish(status, message);
                true
            }
            None => false,
        }
    }

    /// Add a warning id to the ignore list; returns false if already present
    pub fn ignore_warning(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.ignored_warnings.contains(&id) {
            false
        } else {
            self.ignored_warnings.push(id);
            true
        }
    }
}

/// In-place edit of the stored state. Returns false to skip the save.
pub type StateChange<'a> = Box<dyn FnOnce(&mut PersistedState) -> bool + Send + 'a>;

/// Storage backend for [`PersistedState`]
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the current state; a missing store yields the default state
    async fn load(&self) -> Result<PersistedState, StateError>;

    /// Replace the stored state
    async fn save(&self, state: &PersistedState) -> Result<(), StateError>;

    /// Load, apply `change` and save without another writer in between.
    /// Returns the state after the change.
    async fn update(&self, change: StateChange<'_>) -> Result<PersistedState, StateError>;

    /// Remove all stored state
    async fn clear(&self) -> Result<(), StateError> {
        self.save(&PersistedState::default()).await
    }
}
