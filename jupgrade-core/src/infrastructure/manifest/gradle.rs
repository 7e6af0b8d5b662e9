//! Textual Gradle build script version rewriting

use super::{ManifestError, splice};
use crate::infrastructure::parsers::gradle::{
    RE_MAP_COORD, RE_STRING_COORD, RE_VARIABLE, variable_reference,
};

/// Set the version of every declaration of `group_id:artifact_id` that carries
/// one. When the version is a `$variable`, the variable's assignment is
/// rewritten instead.
pub fn rewrite_gradle_dependency(
    content: &str,
    group_id: &str,
    artifact_id: &str,
    new_version: &str,
) -> Result<String, ManifestError> {
    let key = format!("{}:{}", group_id, artifact_id);
    let mut spans = Vec::new();

    for pattern in [&*RE_STRING_COORD, &*RE_MAP_COORD] {
        for caps in pattern.captures_iter(content) {
            let same_group = caps.get(2).map(|m| m.as_str().trim()) == Some(group_id);
            let same_artifact = caps.get(3).map(|m| m.as_str().trim()) == Some(artifact_id);
            if !(same_group && same_artifact) {
                continue;
            }
            let Some(version) = caps.get(4) else { continue };

            match variable_reference(version.as_str()) {
                Some(name) => {
                    let assignment = RE_VARIABLE
                        .captures_iter(content)
                        .find(|v| v[1].trim_start_matches("ext.") == name)
                        .and_then(|v| v.get(2))
                        .ok_or_else(|| ManifestError::PropertyNotFound {
                            key: key.clone(),
                            property: name.to_string(),
                        })?;
                    spans.push((assignment.start(), assignment.end()));
                }
                None => spans.push((version.start(), version.end())),
            }
        }
    }

    if spans.is_empty() {
        return Err(ManifestError::DependencyNotFound { key });
    }

    tracing::debug!(dependency = %key, edits = spans.len(), "Rewriting Gradle version");
    Ok(splice(content, spans, new_version))
}
