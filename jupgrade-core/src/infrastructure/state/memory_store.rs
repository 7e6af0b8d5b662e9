//! In-memory state store

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{PersistedState, StateChange, StateError, StateStore};

/// State held in memory only; used for dry runs and tests
#[derive(Default)]
pub struct InMemoryStateStore {
    state: RwLock<PersistedState>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self) -> Result<PersistedState, StateError> {
        Ok(self.state.read().await.clone())
    }

    async fn save(&self, state: &PersistedState) -> Result<(), StateError> {
        *self.state.write().await = state.clone();
        Ok(())
    }

    async fn update(&self, change: StateChange<'_>) -> Result<PersistedState, StateError> {
        let mut state = self.state.write().await;
        change(&mut *state);
        Ok(state.clone())
    }
}
