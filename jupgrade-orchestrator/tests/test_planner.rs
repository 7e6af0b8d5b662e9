//! Plan generation against analyzed projects

mod common;

use std::sync::Arc;

use common::*;
use jupgrade_core::config::UpgradeConfig;
use jupgrade_core::domain::project::ProjectInfo;
use jupgrade_deps::{DependencyManager, DependencyResolver};
use jupgrade_orchestrator::application::{ProjectAnalyzer, UpgradePlanner};

async fn analyze(root: &std::path::Path) -> ProjectInfo {
    ProjectAnalyzer::new(UpgradeConfig::default().build_tool)
        .analyze_project(root)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_gradle_boot_project_plan() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "build.gradle", BUILD_GRADLE_BOOT);
    let config = UpgradeConfig {
        custom_recipes: vec!["com.example.OurCleanup".into()],
        ..Default::default()
    };

    let project = ProjectAnalyzer::new(config.build_tool)
        .analyze_project(dir.path())
        .await
        .unwrap();
    let resolver = FakeResolver::default().with("com.google.guava:guava", "33.0.0-jre");
    let plan = UpgradePlanner::new(Arc::new(resolver), config)
        .generate_plan(&project)
        .await;

    assert_eq!(plan.target_java_version(), "17");
    assert_eq!(plan.target_framework_version(), Some("2.7.18"));
    assert_eq!(
        plan.recipes(),
        &[
            "org.openrewrite.java.migrate.UpgradeToJava17".to_string(),
            "org.openrewrite.staticanalysis.CommonStaticAnalysis".to_string(),
            "org.openrewrite.java.RemoveUnusedImports".to_string(),
            "org.openrewrite.java.spring.boot2.UpgradeSpringBoot_2_7".to_string(),
            "com.example.OurCleanup".to_string(),
        ]
    );
    assert_eq!(plan.dependency_updates().len(), 1);
    assert_eq!(plan.dependency_updates()[0].to_version, "33.0.0-jre");
}

#[tokio::test]
async fn test_registry_failure_skips_dependency() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "build.gradle", BUILD_GRADLE_BOOT);
    let project = ProjectAnalyzer::new(UpgradeConfig::default().build_tool)
        .analyze_project(dir.path())
        .await
        .unwrap();

    let resolver = FakeResolver::default().failing("com.google.guava:guava");
    let plan = UpgradePlanner::new(Arc::new(resolver), UpgradeConfig::default())
        .generate_plan(&project)
        .await;
    assert!(plan.dependency_updates().is_empty());
}

#[tokio::test]
async fn test_older_registry_version_is_not_a_downgrade() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "pom.xml", POM_JAVA11_JUNIT);
    let project = ProjectAnalyzer::new(UpgradeConfig::default().build_tool)
        .analyze_project(dir.path())
        .await
        .unwrap();

    let resolver = FakeResolver::default().with("junit:junit", "4.11");
    let plan = UpgradePlanner::new(Arc::new(resolver), UpgradeConfig::default())
        .generate_plan(&project)
        .await;
    assert!(plan.dependency_updates().is_empty());
}

#[tokio::test]
async fn test_framework_override_and_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "build.gradle", BUILD_GRADLE_BOOT);
    let config = UpgradeConfig {
        target_java_version: "11".into(),
        target_framework_version: Some("2.6.0".into()),
        ..Default::default()
    };
    let project = ProjectAnalyzer::new(config.build_tool)
        .analyze_project(dir.path())
        .await
        .unwrap();

    let plan = UpgradePlanner::new(Arc::new(FakeResolver::default()), config)
        .generate_plan(&project)
        .await;

    // Already at the ceiling: no Java migration recipe
    assert_eq!(plan.target_java_version(), "11");
    assert_eq!(plan.target_framework_version(), Some("2.6.0"));
    assert_eq!(
        plan.recipes()[0],
        "org.openrewrite.staticanalysis.CommonStaticAnalysis"
    );
}

#[tokio::test]
async fn test_non_lts_ceiling_keeps_current_release() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "pom.xml", POM_JAVA11_JUNIT);
    let config = UpgradeConfig {
        target_java_version: "15".into(),
        ..Default::default()
    };
    let project = ProjectAnalyzer::new(config.build_tool)
        .analyze_project(dir.path())
        .await
        .unwrap();

    let plan = UpgradePlanner::new(Arc::new(FakeResolver::default()), config)
        .generate_plan(&project)
        .await;

    assert_eq!(plan.target_java_version(), "11");
    assert!(
        !plan
            .recipes()
            .iter()
            .any(|recipe| recipe.starts_with("org.openrewrite.java.migrate."))
    );
}

#[tokio::test]
async fn test_shared_property_moves_to_one_version() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "pom.xml", POM_SHARED_PROPERTY);
    let project = analyze(dir.path()).await;

    let resolver = FakeResolver::default()
        .with("com.fasterxml.jackson.core:jackson-databind", "2.17.1")
        .with("com.fasterxml.jackson.core:jackson-core", "2.17.0");
    let plan = UpgradePlanner::new(Arc::new(resolver), UpgradeConfig::default())
        .generate_plan(&project)
        .await;

    let targets: Vec<&str> = plan
        .dependency_updates()
        .iter()
        .map(|u| u.to_version.as_str())
        .collect();
    assert_eq!(targets, vec!["2.17.0", "2.17.0"]);

    DependencyManager::new()
        .apply_updates(&project, plan.dependency_updates())
        .await
        .unwrap();
    let reread = analyze(dir.path()).await;
    for dependency in &reread.dependencies {
        assert_eq!(dependency.version, "2.17.0", "{}", dependency.key());
    }
}

#[tokio::test]
async fn test_shared_property_stays_when_one_lookup_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "pom.xml", POM_SHARED_PROPERTY);
    let project = analyze(dir.path()).await;

    let resolver = FakeResolver::default()
        .with("com.fasterxml.jackson.core:jackson-databind", "2.17.1")
        .failing("com.fasterxml.jackson.core:jackson-core");
    let plan = UpgradePlanner::new(Arc::new(resolver), UpgradeConfig::default())
        .generate_plan(&project)
        .await;
    assert!(plan.dependency_updates().is_empty());
}

#[tokio::test]
async fn test_declared_range_bounds_the_update() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "pom.xml", POM_VERSION_RANGES);
    let project = analyze(dir.path()).await;

    let registry = FixedRegistry(vec!["4.11", "4.12", "4.13.2", "5.0.0", "5.1.0"]);
    let resolver = DependencyResolver::new(Arc::new(registry));
    let plan = UpgradePlanner::new(Arc::new(resolver), UpgradeConfig::default())
        .generate_plan(&project)
        .await;

    // The hard pin on hamcrest is left alone
    let updates = plan.dependency_updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].key(), "junit:junit");
    assert_eq!(updates[0].from_version, "[4.12,5.0)");
    assert_eq!(updates[0].to_version, "4.13.2");

    DependencyManager::new()
        .apply_updates(&project, updates)
        .await
        .unwrap();
    let pom = std::fs::read_to_string(dir.path().join("pom.xml")).unwrap();
    assert!(pom.contains("<version>4.13.2</version>"));
    assert!(pom.contains("<version>[4.12]</version>"));
}
