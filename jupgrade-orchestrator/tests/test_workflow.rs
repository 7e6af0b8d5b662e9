//! End-to-end orchestrator runs against fake collaborators

mod common;

use common::*;
use tokio_util::sync::CancellationToken;

use jupgrade_core::application::errors::UpgradeError;
use jupgrade_core::domain::upgrade::UpgradeStatus;
use jupgrade_core::infrastructure::state::StateStore;
use jupgrade_orchestrator::infrastructure::UpgradeLock;
use jupgrade_orchestrator::{
    PlanDecision, UpgradeOptions, UpgradeOutcome, UpgradePhase, WorkflowError,
};

fn dry_run() -> UpgradeOptions {
    UpgradeOptions { dry_run: true }
}

#[tokio::test]
async fn test_java8_maven_project_plans_java11() {
    let project = tempfile::tempdir().unwrap();
    let reports = tempfile::tempdir().unwrap();
    write_project(project.path(), "pom.xml", POM_JAVA8_EMPTY);
    let harness = HarnessBuilder::default().build(reports.path());

    let outcome = harness
        .orchestrator
        .run(project.path(), &dry_run(), &CancellationToken::new())
        .await
        .unwrap();

    let UpgradeOutcome::DryRun { project: info, plan } = outcome else {
        panic!("expected a dry run");
    };
    assert_eq!(info.current_java_version, "8");
    assert_eq!(plan.target_java_version(), "11");
    assert_eq!(
        plan.recipes(),
        &[
            "org.openrewrite.java.migrate.Java8toJava11".to_string(),
            "org.openrewrite.staticanalysis.CommonStaticAnalysis".to_string(),
            "org.openrewrite.java.RemoveUnusedImports".to_string(),
        ]
    );
    assert!(plan.dependency_updates().is_empty());
    assert_eq!(harness.recipes.call_count(), 0);
    assert_eq!(harness.orchestrator.session().await.phase, UpgradePhase::Idle);
}

#[tokio::test]
async fn test_rejected_plan_changes_nothing() {
    let project = tempfile::tempdir().unwrap();
    let reports = tempfile::tempdir().unwrap();
    write_project(project.path(), "pom.xml", POM_JAVA8_EMPTY);
    let harness = HarnessBuilder {
        decision: PlanDecision::Rejected,
        ..Default::default()
    }
    .build(reports.path());

    let outcome = harness
        .orchestrator
        .run(project.path(), &UpgradeOptions::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(outcome, UpgradeOutcome::Rejected { .. }));
    assert_eq!(harness.recipes.call_count(), 0);
    assert!(harness.state.load().await.unwrap().upgrade_history.is_empty());

    let session = harness.orchestrator.session().await;
    assert_eq!(session.phase, UpgradePhase::Idle);
    assert!(session.history_id.is_none());
    assert_eq!(
        std::fs::read_to_string(project.path().join("pom.xml")).unwrap(),
        POM_JAVA8_EMPTY
    );
}

#[tokio::test]
async fn test_second_start_is_rejected_while_locked() {
    let project = tempfile::tempdir().unwrap();
    let reports = tempfile::tempdir().unwrap();
    write_project(project.path(), "pom.xml", POM_JAVA8_EMPTY);
    let harness = HarnessBuilder::default().build(reports.path());

    let held = UpgradeLock::acquire(project.path()).unwrap();
    let err = harness
        .orchestrator
        .run(project.path(), &dry_run(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Upgrade(UpgradeError::UpgradeInProgress { .. })
    ));

    drop(held);
    harness
        .orchestrator
        .run(project.path(), &dry_run(), &CancellationToken::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_approved_upgrade_updates_manifest_and_history() {
    let project = tempfile::tempdir().unwrap();
    let reports = tempfile::tempdir().unwrap();
    write_project(project.path(), "pom.xml", POM_JAVA11_JUNIT);
    let harness = HarnessBuilder {
        resolver: FakeResolver::default().with("junit:junit", "4.13.2"),
        ..Default::default()
    }
    .build(reports.path());

    let outcome = harness
        .orchestrator
        .run(project.path(), &UpgradeOptions::default(), &CancellationToken::new())
        .await
        .unwrap();

    let UpgradeOutcome::Finished(summary) = outcome else {
        panic!("expected a finished run");
    };
    assert_eq!(summary.status, UpgradeStatus::Completed);
    assert_eq!(summary.plan.target_java_version(), "17");
    assert!(summary.backup_id.is_some());
    assert!(summary.checkpoints.is_empty());
    assert_eq!(summary.report_paths.len(), 2);
    assert_eq!(
        summary.result.changed_files,
        vec![std::path::PathBuf::from("pom.xml")]
    );

    let pom = std::fs::read_to_string(project.path().join("pom.xml")).unwrap();
    assert!(pom.contains("<version>4.13.2</version>"));
    assert_eq!(harness.recipes.call_count(), 1);

    let state = harness.state.load().await.unwrap();
    assert_eq!(state.upgrade_history.len(), 1);
    assert_eq!(state.upgrade_history[0].status, UpgradeStatus::Completed);
    assert_eq!(state.upgrade_history[0].from_version, "11");
    assert!(state.last_upgrade_timestamp.is_some());

    assert_eq!(harness.orchestrator.session().await.phase, UpgradePhase::Complete);
    assert!(!project.path().join(".jupgrade/upgrade.lock").exists());
}

#[tokio::test]
async fn test_failing_tests_mark_history_failed() {
    let project = tempfile::tempdir().unwrap();
    let reports = tempfile::tempdir().unwrap();
    write_project(project.path(), "pom.xml", POM_JAVA8_EMPTY);
    let harness = HarnessBuilder {
        build: FakeBuild::failing_tests(),
        ..Default::default()
    }
    .build(reports.path());

    let outcome = harness
        .orchestrator
        .run(project.path(), &UpgradeOptions::default(), &CancellationToken::new())
        .await
        .unwrap();

    let UpgradeOutcome::Finished(summary) = outcome else {
        panic!("expected a finished run");
    };
    assert_eq!(summary.status, UpgradeStatus::Failed);
    let state = harness.state.load().await.unwrap();
    assert_eq!(state.upgrade_history[0].status, UpgradeStatus::Failed);
    assert!(state.last_upgrade_timestamp.is_none());
}

#[tokio::test]
async fn test_recipe_failure_moves_to_error() {
    let project = tempfile::tempdir().unwrap();
    let reports = tempfile::tempdir().unwrap();
    write_project(project.path(), "pom.xml", POM_JAVA8_EMPTY);
    let harness = HarnessBuilder {
        recipes: RecordingRecipeRunner {
            fail_with: Some("org.openrewrite.java.migrate.Java8toJava11".into()),
            ..Default::default()
        },
        ..Default::default()
    }
    .build(reports.path());

    let err = harness
        .orchestrator
        .run(project.path(), &UpgradeOptions::default(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Upgrade(UpgradeError::RecipeApplicationFailure { .. })
    ));

    let session = harness.orchestrator.session().await;
    assert_eq!(session.phase, UpgradePhase::Error);
    assert!(session.error.is_some());
    let state = harness.state.load().await.unwrap();
    assert_eq!(state.upgrade_history[0].status, UpgradeStatus::Failed);
    assert_eq!(harness.build.test_runs.load(std::sync::atomic::Ordering::SeqCst), 0);

    // A failed session resets on the next run
    harness
        .orchestrator
        .run(project.path(), &dry_run(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(harness.orchestrator.session().await.phase, UpgradePhase::Idle);
}

#[tokio::test]
async fn test_cancellation_records_cancelled_entry() {
    let project = tempfile::tempdir().unwrap();
    let reports = tempfile::tempdir().unwrap();
    write_project(project.path(), "pom.xml", POM_JAVA8_EMPTY);
    let harness = HarnessBuilder {
        recipes: RecordingRecipeRunner {
            cancel_during_run: true,
            ..Default::default()
        },
        ..Default::default()
    }
    .build(reports.path());

    let err = harness
        .orchestrator
        .run(project.path(), &UpgradeOptions::default(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.is_cancelled());

    let state = harness.state.load().await.unwrap();
    assert_eq!(state.upgrade_history[0].status, UpgradeStatus::Cancelled);
    assert_eq!(harness.orchestrator.session().await.phase, UpgradePhase::Error);
}

#[tokio::test]
async fn test_missing_build_file_fails_analysis() {
    let project = tempfile::tempdir().unwrap();
    let reports = tempfile::tempdir().unwrap();
    let harness = HarnessBuilder::default().build(reports.path());

    let err = harness
        .orchestrator
        .run(project.path(), &dry_run(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Upgrade(UpgradeError::BuildSystemNotFound { .. })
    ));
    assert!(harness.state.load().await.unwrap().upgrade_history.is_empty());
}
