//! In-place manifest version rewriting
//!
//! Rewrites touch only the version text of the matching declaration (or the
//! property / variable it references). Every other byte of the file is kept.

pub mod gradle;
pub mod maven;

use thiserror::Error;

use crate::domain::project::BuildSystem;

pub use gradle::rewrite_gradle_dependency;
pub use maven::rewrite_maven_dependency;

/// Manifest rewrite errors
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("No declaration with an explicit version found for {key}")]
    DependencyNotFound { key: String },

    #[error("Version property '{property}' referenced by {key} is not defined in this file")]
    PropertyNotFound { key: String, property: String },

    #[error("XML error at byte {position}: {message}")]
    Xml { position: usize, message: String },
}

/// Rewrite the version of `group_id:artifact_id` in a manifest of the given kind
pub fn rewrite_dependency_version(
    build_system: BuildSystem,
    content: &str,
    group_id: &str,
    artifact_id: &str,
    new_version: &str,
) -> Result<String, ManifestError> {
    match build_system {
        BuildSystem::Maven => rewrite_maven_dependency(content, group_id, artifact_id, new_version),
        BuildSystem::Gradle => {
            rewrite_gradle_dependency(content, group_id, artifact_id, new_version)
        }
    }
}

/// Replace non-overlapping byte ranges, keeping everything else
pub(crate) fn splice(content: &str, mut spans: Vec<(usize, usize)>, replacement: &str) -> String {
    spans.sort_unstable();
    spans.dedup();

    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;
    for (start, end) in spans {
        if start < cursor {
            continue;
        }
        out.push_str(&content[cursor..start]);
        out.push_str(replacement);
        cursor = end;
    }
    out.push_str(&content[cursor..]);
    out
}
