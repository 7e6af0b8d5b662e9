use std::path::{Path, PathBuf};

use async_trait::async_trait;
use git2::{
    DiffOptions, IndexAddOption, Repository, ResetType, Signature, StashFlags, StatusOptions,
};
use tracing::{debug, info};

use jupgrade_core::application::errors::UpgradeError;

use crate::domain::services::VersionControl;

/// Tool-owned directory that is never committed
const WORK_DIR: &str = ".jupgrade";

/// Errors emitted by the Git service.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),
    #[error("Blocking git task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Version control on the local repository through libgit2.
///
/// Every operation opens the repository on a blocking thread.
#[derive(Debug, Default)]
pub struct GitVersionControl;

impl GitVersionControl {
    pub fn new() -> Self {
        Self
    }

    async fn with_repo<T, F>(operation: &'static str, root: &Path, f: F) -> Result<T, UpgradeError>
    where
        F: FnOnce(&mut Repository) -> Result<T, git2::Error> + Send + 'static,
        T: Send + 'static,
    {
        let root = root.to_path_buf();
        let result = tokio::task::spawn_blocking(move || -> Result<T, GitError> {
            let mut repo = Repository::open(&root)?;
            Ok(f(&mut repo)?)
        })
        .await
        .map_err(GitError::from)
        .and_then(|inner| inner);

        result.map_err(|e| UpgradeError::git(operation, e))
    }
}

fn signature(repo: &Repository) -> Result<Signature<'static>, git2::Error> {
    repo.signature()
        .map(|s| s.to_owned())
        .or_else(|_| Signature::now("jupgrade", "jupgrade@localhost"))
}

fn is_work_dir(path: &Path) -> bool {
    path.starts_with(WORK_DIR)
}

/// Ignore the tool directory in this repository so stashes, commits and diffs
/// never touch the lock file or backups. Ignored files are not stashed.
fn exclude_work_dir(repo: &Repository) -> Result<(), git2::Error> {
    let pattern = format!("/{}/", WORK_DIR);
    repo.add_ignore_rule(&pattern)?;

    let exclude = repo.path().join("info").join("exclude");
    let current = std::fs::read_to_string(&exclude).unwrap_or_default();
    if current.lines().any(|line| line.trim() == pattern) {
        return Ok(());
    }

    let mut updated = current;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(&pattern);
    updated.push('\n');
    if let Some(parent) = exclude.parent() {
        std::fs::create_dir_all(parent).map_err(|e| git2::Error::from_str(&e.to_string()))?;
    }
    std::fs::write(&exclude, updated).map_err(|e| git2::Error::from_str(&e.to_string()))?;
    debug!(path = %exclude.display(), "Excluded tool directory from git");
    Ok(())
}

fn has_changes(repo: &Repository) -> Result<bool, git2::Error> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true).recurse_untracked_dirs(true);
    let statuses = repo.statuses(Some(&mut opts))?;
    Ok(statuses
        .iter()
        .filter_map(|entry| entry.path().map(PathBuf::from))
        .any(|path| !is_work_dir(&path)))
}

fn tag_ref(tag: &str) -> String {
    format!("refs/tags/{}", tag)
}

#[async_trait]
impl VersionControl for GitVersionControl {
    async fn is_repository(&self, root: &Path) -> bool {
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || Repository::open(root).is_ok())
            .await
            .unwrap_or(false)
    }

    async fn stash_uncommitted(&self, root: &Path, message: &str) -> Result<bool, UpgradeError> {
        let message = message.to_string();
        Self::with_repo("stash", root, move |repo| {
            exclude_work_dir(repo)?;
            if !has_changes(repo)? {
                return Ok(false);
            }
            let sig = signature(repo)?;
            let oid = repo.stash_save(&sig, &message, Some(StashFlags::INCLUDE_UNTRACKED))?;
            info!(stash = %oid, "Stashed uncommitted changes");
            Ok(true)
        })
        .await
    }

    async fn create_branch(&self, root: &Path, name: &str) -> Result<(), UpgradeError> {
        let name = name.to_string();
        Self::with_repo("branch", root, move |repo| {
            let head = repo.head()?.peel_to_commit()?;
            repo.branch(&name, &head, false)?;
            repo.set_head(&format!("refs/heads/{}", name))?;
            info!(branch = %name, "Switched to upgrade branch");
            Ok(())
        })
        .await
    }

    async fn commit_all(&self, root: &Path, message: &str) -> Result<Option<String>, UpgradeError> {
        let message = message.to_string();
        Self::with_repo("commit", root, move |repo| {
            let mut index = repo.index()?;
            let skip_work_dir = &mut |path: &Path, _spec: &[u8]| -> i32 {
                if is_work_dir(path) { 1 } else { 0 }
            };
            index.add_all(
                ["*"].iter(),
                IndexAddOption::DEFAULT,
                Some(skip_work_dir as &mut git2::IndexMatchedPath),
            )?;
            index.update_all(["*"].iter(), None)?;
            index.write()?;

            let tree = repo.find_tree(index.write_tree()?)?;
            let parent = repo.head()?.peel_to_commit()?;
            if tree.id() == parent.tree_id() {
                debug!("Nothing to commit");
                return Ok(None);
            }

            let sig = signature(repo)?;
            let oid = repo.commit(Some("HEAD"), &sig, &sig, &message, &tree, &[&parent])?;
            info!(commit = %oid, "Committed upgrade step");
            Ok(Some(oid.to_string()))
        })
        .await
    }

    async fn tag(&self, root: &Path, name: &str) -> Result<(), UpgradeError> {
        let name = name.to_string();
        Self::with_repo("tag", root, move |repo| {
            let head = repo.head()?.peel_to_commit()?;
            repo.tag_lightweight(&name, head.as_object(), false)?;
            debug!(tag = %name, "Created checkpoint tag");
            Ok(())
        })
        .await
    }

    async fn changed_files_since(
        &self,
        root: &Path,
        tag: &str,
    ) -> Result<Vec<PathBuf>, UpgradeError> {
        let reference = tag_ref(tag);
        Self::with_repo("diff", root, move |repo| {
            let tree = repo.revparse_single(&reference)?.peel_to_tree()?;
            let mut opts = DiffOptions::new();
            opts.include_untracked(true).recurse_untracked_dirs(true);
            let diff = repo.diff_tree_to_workdir_with_index(Some(&tree), Some(&mut opts))?;

            let mut files: Vec<PathBuf> = diff
                .deltas()
                .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
                .filter(|path| !is_work_dir(path))
                .map(Path::to_path_buf)
                .collect();
            files.sort();
            files.dedup();
            Ok(files)
        })
        .await
    }

    async fn list_tags(&self, root: &Path, prefix: &str) -> Result<Vec<String>, UpgradeError> {
        let pattern = format!("{}*", prefix);
        Self::with_repo("tag list", root, move |repo| {
            let names = repo.tag_names(Some(&pattern))?;
            Ok(names.iter().flatten().map(str::to_string).collect())
        })
        .await
    }

    async fn reset_to(&self, root: &Path, tag: &str) -> Result<(), UpgradeError> {
        let reference = tag_ref(tag);
        Self::with_repo("reset", root, move |repo| {
            let target = repo.revparse_single(&reference)?.peel_to_commit()?;
            repo.reset(target.as_object(), ResetType::Hard, None)?;
            info!(target = %target.id(), "Reset work tree to checkpoint");
            Ok(())
        })
        .await
    }
}
