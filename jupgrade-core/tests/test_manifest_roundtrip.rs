//! Parse, rewrite and re-parse real-looking manifests

mod common;

use common::*;
use jupgrade_core::domain::project::BuildSystem;
use jupgrade_core::infrastructure::ManifestParser;
use jupgrade_core::infrastructure::manifest::{ManifestError, rewrite_dependency_version};
use jupgrade_core::infrastructure::parsers::ParserFactory;

async fn version_of(filename: &str, content: &str, key: &str) -> Option<String> {
    let factory = ParserFactory::new();
    let parser = factory.create_parser(filename).expect("supported manifest");
    parser
        .parse_file(content)
        .await
        .expect("manifest parses")
        .dependencies
        .into_iter()
        .find(|d| d.key() == key)
        .map(|d| d.version)
}

#[tokio::test]
async fn test_pom_property_rewrite_is_visible_to_parser() {
    let pom = sample_pom_xml();
    assert_eq!(
        version_of("pom.xml", pom, "com.google.guava:guava").await.as_deref(),
        Some("30.1-jre")
    );

    let rewritten = rewrite_dependency_version(
        BuildSystem::Maven,
        pom,
        "com.google.guava",
        "guava",
        "33.0.0-jre",
    )
    .unwrap();

    assert!(rewritten.contains("<guava.version>33.0.0-jre</guava.version>"));
    assert!(rewritten.contains("<version>${guava.version}</version>"));
    assert_eq!(
        version_of("pom.xml", &rewritten, "com.google.guava:guava").await.as_deref(),
        Some("33.0.0-jre")
    );
    // Untouched declarations keep their bytes
    assert_eq!(
        version_of("pom.xml", &rewritten, "junit:junit").await.as_deref(),
        Some("4.12")
    );
    assert_eq!(rewritten.len(), pom.len() + "33.0.0-jre".len() - "30.1-jre".len());
}

#[tokio::test]
async fn test_gradle_variable_rewrite_is_visible_to_parser() {
    let gradle = sample_build_gradle();
    let rewritten = rewrite_dependency_version(
        BuildSystem::Gradle,
        gradle,
        "com.fasterxml.jackson.core",
        "jackson-databind",
        "2.15.3",
    )
    .unwrap();

    assert!(rewritten.contains("def jacksonVersion = '2.15.3'"));
    assert_eq!(
        version_of(
            "build.gradle",
            &rewritten,
            "com.fasterxml.jackson.core:jackson-databind"
        )
        .await
        .as_deref(),
        Some("2.15.3")
    );
}

#[tokio::test]
async fn test_gradle_map_notation_rewrite() {
    let rewritten = rewrite_dependency_version(
        BuildSystem::Gradle,
        sample_build_gradle(),
        "junit",
        "junit",
        "4.13.2",
    )
    .unwrap();
    assert!(rewritten.contains("version: '4.13.2'"));
}

#[test]
fn test_unknown_dependency_is_reported() {
    let err = rewrite_dependency_version(
        BuildSystem::Maven,
        sample_pom_xml(),
        "org.example",
        "missing",
        "1.0",
    )
    .unwrap_err();
    assert!(matches!(err, ManifestError::DependencyNotFound { .. }));
}

#[tokio::test]
async fn test_parse_fixture_files_from_disk() {
    let dir = create_temp_dir();
    let path = create_temp_file(&dir, "pom.xml", sample_pom_xml()).await;
    let content = tokio::fs::read_to_string(&path).await.unwrap();

    let factory = ParserFactory::new();
    let parsed = factory
        .create_parser("pom.xml")
        .unwrap()
        .parse_file(&content)
        .await
        .unwrap();
    assert_eq!(parsed.java_version.as_deref(), Some("8"));
    assert_eq!(parsed.framework_version.as_deref(), Some("2.5.6"));
}
