//! Test helper functions for jupgrade-core

use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Create a temporary file with content
pub async fn create_temp_file(dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let path = dir.path().join(filename);
    tokio::fs::write(&path, content)
        .await
        .expect("Failed to write temp file");
    path
}

/// Maven Central search response listing the given versions
pub fn maven_search_body(group: &str, artifact: &str, versions: &[&str]) -> serde_json::Value {
    let docs: Vec<serde_json::Value> = versions
        .iter()
        .map(|v| {
            serde_json::json!({
                "id": format!("{}:{}:{}", group, artifact, v),
                "g": group,
                "a": artifact,
                "v": v,
            })
        })
        .collect();
    serde_json::json!({
        "responseHeader": {"status": 0},
        "response": {"numFound": docs.len(), "start": 0, "docs": docs}
    })
}
