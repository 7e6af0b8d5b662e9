//! Orchestrator application layer

pub mod analyzer;
pub mod history;
pub mod planner;
pub mod restore;
pub mod test_generation;
pub mod validation;
pub mod workflow;

pub use analyzer::ProjectAnalyzer;
pub use history::HistoryService;
pub use planner::UpgradePlanner;
pub use restore::RestoreService;
pub use test_generation::{GeneratedTests, TestGenerator};
pub use validation::ValidationStage;
pub use workflow::{
    OrchestratorSettings, UpgradeOrchestrator, UpgradeOutcome, UpgradeServices, UpgradeSummary,
    WorkflowError,
};
