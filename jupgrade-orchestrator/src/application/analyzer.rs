//! Project analysis: find the build file and read what it declares

use std::path::Path;

use tracing::{info, instrument, warn};

use jupgrade_core::application::errors::{ParseError, UpgradeError};
use jupgrade_core::domain::project::{BuildSystem, ProjectInfo};
use jupgrade_core::infrastructure::ParserFactory;

use crate::infrastructure::project_detection::detect_build_file;

/// Java version assumed when the build declares none
pub const DEFAULT_JAVA_VERSION: &str = "8";

pub struct ProjectAnalyzer {
    parsers: ParserFactory,
    configured_build_tool: BuildSystem,
}

impl ProjectAnalyzer {
    pub fn new(configured_build_tool: BuildSystem) -> Self {
        Self {
            parsers: ParserFactory::new(),
            configured_build_tool,
        }
    }

    /// Build a [`ProjectInfo`] for the project rooted at `root`
    #[instrument(skip(self), fields(root = %root.display()))]
    pub async fn analyze_project(&self, root: &Path) -> Result<ProjectInfo, UpgradeError> {
        let (build_system, manifest_path) =
            detect_build_file(root).ok_or_else(|| UpgradeError::BuildSystemNotFound {
                path: root.to_path_buf(),
            })?;

        if build_system != self.configured_build_tool {
            warn!(
                configured = %self.configured_build_tool,
                detected = %build_system,
                "Configured build tool differs from the project; using the detected one"
            );
        }

        let content = tokio::fs::read_to_string(&manifest_path)
            .await
            .map_err(|source| ParseError::Io {
                path: manifest_path.clone(),
                source,
            })?;

        let filename = manifest_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let parser = self
            .parsers
            .create_parser(filename)
            .ok_or_else(|| UpgradeError::ManifestNotFound {
                path: manifest_path.clone(),
            })?;
        let parsed = parser.parse_file(&content).await?;

        let current_java_version = match parsed.java_version {
            Some(version) => version,
            None => {
                warn!(
                    assumed = DEFAULT_JAVA_VERSION,
                    "No Java version declared in the build file"
                );
                DEFAULT_JAVA_VERSION.to_string()
            }
        };

        info!(
            build_system = %build_system,
            java = %current_java_version,
            framework = parsed.framework_version.as_deref().unwrap_or("none"),
            dependencies = parsed.dependencies.len(),
            "Project analyzed"
        );

        Ok(ProjectInfo {
            root: root.to_path_buf(),
            build_system,
            manifest_path,
            current_java_version,
            dependencies: parsed.dependencies,
            framework_version: parsed.framework_version,
        })
    }
}
