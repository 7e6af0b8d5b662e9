//! Test helper functions for jupgrade-deps

use jupgrade_core::domain::version::ArtifactVersion;
use jupgrade_deps::VersionConstraint;

/// Assert whether `version` satisfies `constraint`
pub fn assert_version_satisfies(version: &str, constraint: &str, expected: bool) {
    let parsed = VersionConstraint::parse(constraint).expect("valid constraint");
    assert_eq!(
        parsed.satisfies(&ArtifactVersion::parse(version)),
        expected,
        "{} satisfies {}",
        version,
        constraint
    );
}

/// Maven Central search response listing the given versions
pub fn maven_search_body(versions: &[&str]) -> serde_json::Value {
    let docs: Vec<serde_json::Value> = versions
        .iter()
        .map(|v| serde_json::json!({ "v": v }))
        .collect();
    serde_json::json!({ "response": { "numFound": docs.len(), "docs": docs } })
}
