//! JSON report format implementation

use crate::application::reporting::{ReportError, UpgradeReport};

/// Generate JSON report for tooling
pub fn generate_json_report(report: &UpgradeReport) -> Result<String, ReportError> {
    serde_json::to_string_pretty(report).map_err(ReportError::Json)
}
