//! Upgrade history and user state on top of a [`StateStore`]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use jupgrade_core::domain::project::BuildSystem;
use jupgrade_core::domain::upgrade::{UpgradeHistoryEntry, UpgradeStatus};
use jupgrade_core::infrastructure::state::{PersistedState, StateError, StateStore};

/// Read-modify-write access to persisted state
#[derive(Clone)]
pub struct HistoryService {
    store: Arc<dyn StateStore>,
    max_entries: usize,
}

impl HistoryService {
    pub fn new(store: Arc<dyn StateStore>, max_entries: usize) -> Self {
        Self { store, max_entries }
    }

    pub async fn state(&self) -> Result<PersistedState, StateError> {
        self.store.load().await
    }

    /// Append an in-progress entry and return its id
    pub async fn record_start(
        &self,
        from_version: &str,
        to_version: &str,
        build_tool: BuildSystem,
    ) -> Result<Uuid, StateError> {
        let entry = UpgradeHistoryEntry::started(from_version, to_version, build_tool);
        let id = entry.id;
        let max_entries = self.max_entries;
        self.store
            .update(Box::new(move |state: &mut PersistedState| {
                state.push_history(entry, max_entries);
                true
            }))
            .await?;
        debug!(history_id = %id, "Recorded upgrade start");
        Ok(id)
    }

    /// Set the final status of an entry
    pub async fn finish(
        &self,
        id: Uuid,
        status: UpgradeStatus,
        message: Option<String>,
    ) -> Result<(), StateError> {
        let mut found = false;
        self.store
            .update(Box::new(|state: &mut PersistedState| {
                found = state.finish_history(id, status, message);
                if found && status == UpgradeStatus::Completed {
                    state.last_upgrade_timestamp = Some(Utc::now());
                }
                found
            }))
            .await?;
        if !found {
            // Dropped by retention while the run was going
            warn!(history_id = %id, "History entry no longer present");
        }
        Ok(())
    }

    /// Entries newest first
    pub async fn list(&self) -> Result<Vec<UpgradeHistoryEntry>, StateError> {
        let mut entries = self.store.load().await?.upgrade_history;
        entries.reverse();
        Ok(entries)
    }

    pub async fn last_upgrade(&self) -> Result<Option<DateTime<Utc>>, StateError> {
        Ok(self.store.load().await?.last_upgrade_timestamp)
    }

    /// Returns false when the id was already ignored
    pub async fn ignore_warning(&self, id: &str) -> Result<bool, StateError> {
        let mut added = false;
        self.store
            .update(Box::new(|state: &mut PersistedState| {
                added = state.ignore_warning(id);
                added
            }))
            .await?;
        Ok(added)
    }

    pub async fn set_preference(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), StateError> {
        self.store
            .update(Box::new(move |state: &mut PersistedState| {
                state.user_preferences.insert(key.to_string(), value);
                true
            }))
            .await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), StateError> {
        self.store.clear().await
    }
}
