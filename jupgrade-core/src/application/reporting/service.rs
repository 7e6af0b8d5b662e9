//! Report service for writing upgrade reports to disk

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::application::reporting::UpgradeReport;
use crate::application::reporting::formats::{generate_json_report, generate_markdown_report};

/// Directory, relative to the project root, that receives reports
pub const REPORTS_DIR: &str = ".jupgrade/reports";

/// Report errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Service for persisting reports
#[async_trait]
pub trait ReportService: Send + Sync {
    /// Write the report and return the paths written
    async fn write_report(&self, report: &UpgradeReport) -> Result<Vec<PathBuf>, ReportError>;
}

/// Writes `upgrade-<timestamp>.md` and `.json` under the project's reports directory
pub struct FileReportService {
    output_dir: Option<PathBuf>,
}

impl FileReportService {
    /// Write into `<project root>/.jupgrade/reports`
    pub fn new() -> Self {
        Self { output_dir: None }
    }

    /// Write into a fixed directory regardless of project
    pub fn with_output_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: Some(dir.as_ref().to_path_buf()),
        }
    }

    fn directory_for(&self, report: &UpgradeReport) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| report.project_root.join(REPORTS_DIR))
    }
}

impl Default for FileReportService {
    fn default() -> Self {
        Self::new()
    }
}

async fn write_file(path: &Path, content: &str) -> Result<(), ReportError> {
    tokio::fs::write(path, content)
        .await
        .map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[async_trait]
impl ReportService for FileReportService {
    async fn write_report(&self, report: &UpgradeReport) -> Result<Vec<PathBuf>, ReportError> {
        let dir = self.directory_for(report);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| ReportError::Io {
                path: dir.clone(),
                source,
            })?;

        let stem = format!("upgrade-{}", report.generated_at.format("%Y%m%dT%H%M%SZ"));
        let markdown_path = dir.join(format!("{}.md", stem));
        let json_path = dir.join(format!("{}.json", stem));

        write_file(&markdown_path, &generate_markdown_report(report)).await?;
        write_file(&json_path, &generate_json_report(report)?).await?;

        info!(
            markdown = %markdown_path.display(),
            json = %json_path.display(),
            "Wrote upgrade report"
        );

        Ok(vec![markdown_path, json_path])
    }
}
