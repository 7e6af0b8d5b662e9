//! Orchestrator value objects

use serde::{Deserialize, Serialize};

/// Phase of an upgrade session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradePhase {
    Idle,
    Analyzing,
    PlanningUpgrade,
    ExecutingUpgrade,
    Validating,
    Complete,
    Error,
}

impl UpgradePhase {
    /// Returns the set of valid target phases from the current phase.
    ///
    /// ```text
    /// Idle ──► Analyzing ──► PlanningUpgrade ──► ExecutingUpgrade ──► Validating ──► Complete
    ///  ▲           │               │  │                 │                  │            │
    ///  │           └───────────────┼──┴─────► Error ◄───┴──────────────────┘            │
    ///  ├───────────────────────────┘ (rejected)  │                                      │
    ///  └─────────────────────────────────────────┴──────────────────────────────────────┘
    /// ```
    pub fn valid_transitions(&self) -> &[UpgradePhase] {
        match self {
            Self::Idle => &[Self::Analyzing],
            Self::Analyzing => &[Self::PlanningUpgrade, Self::Error],
            Self::PlanningUpgrade => &[Self::ExecutingUpgrade, Self::Idle, Self::Error],
            Self::ExecutingUpgrade => &[Self::Validating, Self::Error],
            Self::Validating => &[Self::Complete, Self::Error],
            Self::Complete | Self::Error => &[Self::Idle],
        }
    }

    pub fn can_transition_to(&self, target: &UpgradePhase) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Whether the session has finished and must be reset before reuse
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

impl std::fmt::Display for UpgradePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Analyzing => write!(f, "Analyzing"),
            Self::PlanningUpgrade => write!(f, "PlanningUpgrade"),
            Self::ExecutingUpgrade => write!(f, "ExecutingUpgrade"),
            Self::Validating => write!(f, "Validating"),
            Self::Complete => write!(f, "Complete"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// Recorded phase change (audit trail)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: UpgradePhase,
    pub to: UpgradePhase,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Error returned when an invalid phase transition is attempted
#[derive(Debug, thiserror::Error)]
#[error("Invalid upgrade phase transition from {from} to {to}")]
pub struct PhaseTransitionError {
    pub from: UpgradePhase,
    pub to: UpgradePhase,
}

/// Per-run switches chosen by the caller
#[derive(Debug, Clone, Default)]
pub struct UpgradeOptions {
    /// Stop after planning
    pub dry_run: bool,
}

/// What the user decided about a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanDecision {
    Approved,
    Rejected,
}

/// Coarse progress events surfaced to the front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressStep {
    Analyzing,
    Planning,
    BackingUp,
    Checkpoint(String),
    ApplyingRecipe { index: usize, total: usize, recipe: String },
    UpdatingDependencies(usize),
    Building,
    Testing,
    ScanningVulnerabilities(usize),
    WritingReport,
}

impl std::fmt::Display for ProgressStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analyzing => write!(f, "Analyzing project"),
            Self::Planning => write!(f, "Planning upgrade"),
            Self::BackingUp => write!(f, "Backing up project"),
            Self::Checkpoint(tag) => write!(f, "Creating checkpoint {}", tag),
            Self::ApplyingRecipe {
                index,
                total,
                recipe,
            } => write!(f, "Applying recipe {}/{}: {}", index, total, recipe),
            Self::UpdatingDependencies(n) => write!(f, "Updating {} dependencies", n),
            Self::Building => write!(f, "Building"),
            Self::Testing => write!(f, "Running tests"),
            Self::ScanningVulnerabilities(n) => {
                write!(f, "Checking {} dependencies for vulnerabilities", n)
            }
            Self::WritingReport => write!(f, "Writing report"),
        }
    }
}
