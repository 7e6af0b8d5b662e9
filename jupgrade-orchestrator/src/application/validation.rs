//! Post-upgrade validation: compile, test, vulnerability scan

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use jupgrade_core::application::errors::UpgradeError;
use jupgrade_core::config::{SecurityConfig, UpgradeConfig};
use jupgrade_core::domain::project::{DependencyCoordinate, ProjectInfo};
use jupgrade_core::domain::upgrade::{UpgradePlan, UpgradeResult};

use crate::domain::services::{BuildRunner, ProgressReporter, VulnerabilityScanner};
use crate::domain::value_objects::ProgressStep;

/// Dependencies as they stand once the plan's updates are applied
pub fn effective_dependencies(
    project: &ProjectInfo,
    plan: &UpgradePlan,
) -> Vec<DependencyCoordinate> {
    project
        .dependencies
        .iter()
        .map(|dependency| {
            let mut dependency = dependency.clone();
            if let Some(update) = plan
                .dependency_updates()
                .iter()
                .find(|u| u.coordinate == dependency)
            {
                dependency.version = update.to_version.clone();
            }
            dependency
        })
        .collect()
}

pub struct ValidationStage {
    build: Arc<dyn BuildRunner>,
    scanner: Arc<dyn VulnerabilityScanner>,
    skip_tests: bool,
    scan_enabled: bool,
}

impl ValidationStage {
    pub fn new(
        build: Arc<dyn BuildRunner>,
        scanner: Arc<dyn VulnerabilityScanner>,
        upgrade: &UpgradeConfig,
        security: &SecurityConfig,
    ) -> Self {
        Self {
            build,
            scanner,
            skip_tests: upgrade.skip_tests,
            scan_enabled: security.enable_cve_check,
        }
    }

    /// Run every check. `changed_files` is left empty for the caller.
    ///
    /// Tests are not run when compilation fails.
    #[instrument(skip_all, fields(root = %project.root.display()))]
    pub async fn validate(
        &self,
        project: &ProjectInfo,
        plan: &UpgradePlan,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<UpgradeResult, UpgradeError> {
        let preview = plan.enable_preview_features();
        let mut result = UpgradeResult::default();

        progress.step(&ProgressStep::Building);
        result.build_success = self.build.compile(project, preview, cancel).await?;
        if !result.build_success {
            warn!("Compilation failed after upgrade");
        }

        if cancel.is_cancelled() {
            return Err(UpgradeError::Cancelled);
        }

        if self.skip_tests {
            result.tests_skipped = true;
            info!("Tests skipped by configuration");
        } else if result.build_success {
            progress.step(&ProgressStep::Testing);
            result.tests_passing = self.build.test(project, preview, cancel).await?;
            if !result.tests_passing {
                warn!("Tests failed after upgrade");
            }
        }

        if cancel.is_cancelled() {
            return Err(UpgradeError::Cancelled);
        }

        if self.scan_enabled {
            let dependencies = effective_dependencies(project, plan);
            progress.step(&ProgressStep::ScanningVulnerabilities(dependencies.len()));
            result.vulnerability_issues = self.scanner.scan(&dependencies, cancel).await?;
        }

        info!(
            build = result.build_success,
            tests = result.tests_passing,
            tests_skipped = result.tests_skipped,
            vulnerabilities = result.vulnerability_issues.len(),
            "Validation finished"
        );
        Ok(result)
    }
}
