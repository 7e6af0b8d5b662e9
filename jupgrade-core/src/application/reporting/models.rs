//! Report data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::domain::project::{BuildSystem, ProjectInfo};
use crate::domain::upgrade::{DependencyUpdate, UpgradePlan, UpgradeResult, UpgradeStatus};
use crate::domain::vulnerability::{Severity, VulnerabilityIssue};

/// Vulnerability counts per severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityBreakdown {
    pub fn from_issues(issues: &[VulnerabilityIssue]) -> Self {
        issues.iter().fold(Self::default(), |mut acc, issue| {
            match issue.severity {
                Severity::Critical => acc.critical += 1,
                Severity::High => acc.high += 1,
                Severity::Medium => acc.medium += 1,
                Severity::Low => acc.low += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// Everything worth telling about one upgrade run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeReport {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub project_root: PathBuf,
    pub build_system: BuildSystem,
    pub status: UpgradeStatus,
    pub from_java_version: String,
    pub to_java_version: String,
    pub from_framework_version: Option<String>,
    pub to_framework_version: Option<String>,
    pub recipes: Vec<String>,
    pub dependency_updates: Vec<DependencyUpdate>,
    pub result: UpgradeResult,
    pub severity_breakdown: SeverityBreakdown,
    /// Checkpoint tags created during the run
    pub checkpoints: Vec<String>,
    pub backup_id: Option<String>,
}

impl UpgradeReport {
    pub fn new(
        history_id: Uuid,
        project: &ProjectInfo,
        plan: &UpgradePlan,
        result: UpgradeResult,
        status: UpgradeStatus,
    ) -> Self {
        let severity_breakdown = SeverityBreakdown::from_issues(&result.vulnerability_issues);
        Self {
            id: history_id,
            generated_at: Utc::now(),
            project_root: project.root.clone(),
            build_system: project.build_system,
            status,
            from_java_version: project.current_java_version.clone(),
            to_java_version: plan.target_java_version().to_string(),
            from_framework_version: project.framework_version.clone(),
            to_framework_version: plan.target_framework_version().map(str::to_string),
            recipes: plan.recipes().to_vec(),
            dependency_updates: plan.dependency_updates().to_vec(),
            result,
            severity_breakdown,
            checkpoints: Vec::new(),
            backup_id: None,
        }
    }

    pub fn with_checkpoints(mut self, checkpoints: Vec<String>) -> Self {
        self.checkpoints = checkpoints;
        self
    }

    pub fn with_backup_id(mut self, backup_id: Option<String>) -> Self {
        self.backup_id = backup_id;
        self
    }
}
