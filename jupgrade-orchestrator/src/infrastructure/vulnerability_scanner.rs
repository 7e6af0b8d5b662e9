//! NVD-backed vulnerability scanning

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

use jupgrade_core::application::errors::UpgradeError;
use jupgrade_core::config::SecurityConfig;
use jupgrade_core::domain::project::DependencyCoordinate;
use jupgrade_core::domain::vulnerability::{Severity, VulnerabilityIssue};
use jupgrade_core::infrastructure::VulnerabilityApiClient;

use crate::domain::services::VulnerabilityScanner;

/// Queries the NVD once per dependency and filters by severity and ignore list
pub struct NvdVulnerabilityScanner {
    client: Arc<dyn VulnerabilityApiClient>,
    min_severity: Severity,
    ignored: HashSet<String>,
}

impl NvdVulnerabilityScanner {
    pub fn new(
        client: Arc<dyn VulnerabilityApiClient>,
        security: &SecurityConfig,
    ) -> Result<Self, UpgradeError> {
        let min_severity = security
            .min_severity_level
            .parse::<Severity>()
            .map_err(UpgradeError::config)?;
        Ok(Self {
            client,
            min_severity,
            ignored: security.ignore_vulnerabilities.iter().cloned().collect(),
        })
    }

    /// Also skip ids the user dismissed earlier
    pub fn with_ignored<I: IntoIterator<Item = String>>(mut self, ids: I) -> Self {
        self.ignored.extend(ids);
        self
    }

    fn keep(&self, issue: &VulnerabilityIssue) -> bool {
        issue.severity >= self.min_severity && !self.ignored.contains(&issue.id)
    }
}

#[async_trait]
impl VulnerabilityScanner for NvdVulnerabilityScanner {
    #[instrument(skip_all, fields(dependencies = dependencies.len()))]
    async fn scan(
        &self,
        dependencies: &[DependencyCoordinate],
        cancel: &CancellationToken,
    ) -> Result<Vec<VulnerabilityIssue>, UpgradeError> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for dependency in dependencies {
            if cancel.is_cancelled() {
                return Err(UpgradeError::Cancelled);
            }
            if !seen.insert(dependency.key()) {
                continue;
            }

            match self.client.query_vulnerabilities(dependency).await {
                Ok(found) => issues.extend(found.into_iter().filter(|i| self.keep(i))),
                Err(e) => {
                    warn!(dependency = %dependency.key(), error = %e, "Vulnerability lookup failed; skipping");
                }
            }
        }

        issues.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.id.cmp(&b.id)));
        Ok(issues)
    }
}
