//! Upgrade entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use super::value_objects::UpgradeStatus;
use crate::domain::project::BuildSystem;
use crate::domain::vulnerability::VulnerabilityIssue;

/// Outcome of the validation stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeResult {
    pub build_success: bool,
    pub tests_passing: bool,
    /// Tests were not run because `skip_tests` is set
    pub tests_skipped: bool,
    pub vulnerability_issues: Vec<VulnerabilityIssue>,
    pub changed_files: Vec<PathBuf>,
}

impl UpgradeResult {
    /// Build passed and tests either passed or were skipped
    pub fn is_success(&self) -> bool {
        self.build_success && (self.tests_passing || self.tests_skipped)
    }
}

/// One recorded upgrade attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeHistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub from_version: String,
    pub to_version: String,
    pub build_tool: BuildSystem,
    pub status: UpgradeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UpgradeHistoryEntry {
    pub fn started(
        from_version: impl Into<String>,
        to_version: impl Into<String>,
        build_tool: BuildSystem,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            from_version: from_version.into(),
            to_version: to_version.into(),
            build_tool,
            status: UpgradeStatus::InProgress,
            message: None,
        }
    }

    pub fn finish(&mut self, status: UpgradeStatus, message: Option<String>) {
        self.status = status;
        self.message = message;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_success_with_skipped_tests() {
        let result = UpgradeResult {
            build_success: true,
            tests_skipped: true,
            ..Default::default()
        };
        assert!(result.is_success());

        let failed = UpgradeResult {
            build_success: true,
            ..Default::default()
        };
        assert!(!failed.is_success());
    }

    #[test]
    fn test_history_entry_json_shape() {
        let mut entry = UpgradeHistoryEntry::started("8", "11", BuildSystem::Maven);
        entry.finish(UpgradeStatus::Completed, None);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["fromVersion"], "8");
        assert_eq!(json["toVersion"], "11");
        assert_eq!(json["buildTool"], "maven");
        assert_eq!(json["status"], "completed");
        assert!(json.get("message").is_none());
    }
}
