//! Project domain module
//!
//! This module defines the analyzed project model shared by the planner, the
//! dependency manager and the orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

/// Build tool driving a Java project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildSystem {
    Maven,
    Gradle,
}

impl BuildSystem {
    /// Wrapper script shipped in the project root, if the project uses one
    pub fn wrapper_script(&self) -> &'static str {
        match self {
            BuildSystem::Maven => "mvnw",
            BuildSystem::Gradle => "gradlew",
        }
    }

    /// Executable looked up on `PATH` when no wrapper is present
    pub fn executable(&self) -> &'static str {
        match self {
            BuildSystem::Maven => "mvn",
            BuildSystem::Gradle => "gradle",
        }
    }
}

impl fmt::Display for BuildSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildSystem::Maven => write!(f, "maven"),
            BuildSystem::Gradle => write!(f, "gradle"),
        }
    }
}

impl std::str::FromStr for BuildSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "maven" | "mvn" => Ok(BuildSystem::Maven),
            "gradle" => Ok(BuildSystem::Gradle),
            other => Err(format!("unknown build tool '{}'", other)),
        }
    }
}

/// A declared dependency.
///
/// Two coordinates are equal when they name the same `group:artifact`,
/// regardless of version or scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Maven property or Gradle variable the version is read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_property: Option<String>,
}

impl DependencyCoordinate {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            scope: None,
            version_property: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_version_property(mut self, property: impl Into<String>) -> Self {
        self.version_property = Some(property.into());
        self
    }

    /// `group:artifact`
    pub fn key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// Whether the version is a concrete value the registry can be compared against
    pub fn has_resolved_version(&self) -> bool {
        let v = self.version.trim();
        !v.is_empty() && !v.contains("${") && !v.starts_with('$')
    }
}

impl PartialEq for DependencyCoordinate {
    fn eq(&self, other: &Self) -> bool {
        self.group_id == other.group_id && self.artifact_id == other.artifact_id
    }
}

impl Eq for DependencyCoordinate {}

impl Hash for DependencyCoordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group_id.hash(state);
        self.artifact_id.hash(state);
    }
}

impl fmt::Display for DependencyCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// Result of analyzing a project root. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub root: PathBuf,
    pub build_system: BuildSystem,
    /// The manifest the analysis was read from
    pub manifest_path: PathBuf,
    /// Normalized Java feature release, e.g. "8" or "17"
    pub current_java_version: String,
    /// Dependencies in declaration order
    pub dependencies: Vec<DependencyCoordinate>,
    pub framework_version: Option<String>,
}
