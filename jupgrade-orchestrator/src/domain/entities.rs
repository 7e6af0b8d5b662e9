//! Orchestrator domain entities

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::value_objects::{PhaseTransition, PhaseTransitionError, UpgradePhase};

/// One orchestrator session and its phase history
#[derive(Debug, Clone, Serialize)]
pub struct UpgradeSession {
    pub session_id: Uuid,
    pub phase: UpgradePhase,
    pub created_at: DateTime<Utc>,
    /// History entry recorded once execution starts
    pub history_id: Option<Uuid>,
    pub error: Option<String>,
    pub transitions: Vec<PhaseTransition>,
}

impl UpgradeSession {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            phase: UpgradePhase::Idle,
            created_at: Utc::now(),
            history_id: None,
            error: None,
            transitions: Vec::new(),
        }
    }

    /// Move to `to`, recording the change. Invalid transitions leave the
    /// session untouched.
    pub fn transition(
        &mut self,
        to: UpgradePhase,
        reason: Option<String>,
    ) -> Result<(), PhaseTransitionError> {
        if !self.phase.can_transition_to(&to) {
            return Err(PhaseTransitionError {
                from: self.phase,
                to,
            });
        }

        tracing::debug!(
            session_id = %self.session_id,
            from = %self.phase,
            to = %to,
            reason = reason.as_deref().unwrap_or(""),
            "Upgrade phase transition"
        );

        self.transitions.push(PhaseTransition {
            from: self.phase,
            to,
            timestamp: Utc::now(),
            reason,
        });
        self.phase = to;
        Ok(())
    }

    /// Return a finished session to Idle for the next run
    pub fn reset(&mut self) -> Result<(), PhaseTransitionError> {
        if self.phase.is_terminal() {
            self.transition(UpgradePhase::Idle, Some("Reset".into()))?;
            self.history_id = None;
            self.error = None;
        }
        Ok(())
    }
}

impl Default for UpgradeSession {
    fn default() -> Self {
        Self::new()
    }
}
