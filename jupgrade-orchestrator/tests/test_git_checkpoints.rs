//! Upgrades against real git repositories with uncommitted work

mod common;

use std::path::Path;

use common::*;
use git2::{IndexAddOption, Repository, Signature};
use tokio_util::sync::CancellationToken;

use jupgrade_core::domain::upgrade::UpgradeStatus;
use jupgrade_orchestrator::domain::{BackupStore, VersionControl};
use jupgrade_orchestrator::infrastructure::{FileBackupStore, GitVersionControl, UpgradeLock};
use jupgrade_orchestrator::{UpgradeOptions, UpgradeOutcome};

const LOCAL_EDIT: &str = "<!-- local edit -->\n";

fn commit_project(root: &Path) {
    let repo = Repository::init(root).unwrap();
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("test", "test@example.com").unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
        .unwrap();
}

fn dirty_pom(root: &Path) {
    let pom = root.join("pom.xml");
    let mut content = std::fs::read_to_string(&pom).unwrap();
    content.push_str(LOCAL_EDIT);
    std::fs::write(pom, content).unwrap();
}

#[tokio::test]
async fn test_stash_keeps_lock_and_backup() {
    let project = tempfile::tempdir().unwrap();
    let root = project.path();
    write_project(root, "pom.xml", POM_JAVA11_JUNIT);
    commit_project(root);

    let lock = UpgradeLock::acquire(root).unwrap();
    let backups = FileBackupStore::new();
    dirty_pom(root);
    let backup_id = backups.create(root).await.unwrap();

    let stashed = GitVersionControl::new()
        .stash_uncommitted(root, "work in progress")
        .await
        .unwrap();
    assert!(stashed);
    assert!(lock.path().exists());
    assert!(root.join(".jupgrade/backups").join(&backup_id).exists());

    let pom = std::fs::read_to_string(root.join("pom.xml")).unwrap();
    assert!(!pom.contains(LOCAL_EDIT));

    backups.restore(root, &backup_id).await.unwrap();
    let pom = std::fs::read_to_string(root.join("pom.xml")).unwrap();
    assert!(pom.contains(LOCAL_EDIT));
}

#[tokio::test]
async fn test_upgrade_in_dirty_repository_keeps_backup_restorable() {
    let project = tempfile::tempdir().unwrap();
    let reports = tempfile::tempdir().unwrap();
    let root = project.path();
    write_project(root, "pom.xml", POM_JAVA11_JUNIT);
    commit_project(root);
    dirty_pom(root);

    let harness = HarnessBuilder {
        resolver: FakeResolver::default().with("junit:junit", "4.13.2"),
        real_git: true,
        ..Default::default()
    }
    .build(reports.path());

    let outcome = harness
        .orchestrator
        .run(root, &UpgradeOptions::default(), &CancellationToken::new())
        .await
        .unwrap();
    let UpgradeOutcome::Finished(summary) = outcome else {
        panic!("expected a finished run");
    };
    assert_eq!(summary.status, UpgradeStatus::Completed);
    assert_eq!(summary.checkpoints.len(), 3);
    assert_eq!(*harness.recipes.lock_seen.lock().unwrap(), vec![true]);

    let backup_id = summary.backup_id.expect("backup taken before the upgrade");
    assert!(root.join(".jupgrade/backups").join(&backup_id).exists());

    let upgraded = std::fs::read_to_string(root.join("pom.xml")).unwrap();
    assert!(upgraded.contains("<version>4.13.2</version>"));

    FileBackupStore::new().restore(root, &backup_id).await.unwrap();
    let restored = std::fs::read_to_string(root.join("pom.xml")).unwrap();
    assert!(restored.contains(LOCAL_EDIT));
    assert!(restored.contains("<version>4.12</version>"));
}
