//! Build file and source tree detection

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use jupgrade_core::domain::project::BuildSystem;
use jupgrade_core::infrastructure::parsers::traits::MANIFEST_FILES;

/// First build file found at `root`, in detection order
pub fn detect_build_file(root: &Path) -> Option<(BuildSystem, PathBuf)> {
    MANIFEST_FILES.iter().find_map(|name| {
        let path = root.join(name);
        if !path.is_file() {
            return None;
        }
        let build_system = if *name == "pom.xml" {
            BuildSystem::Maven
        } else {
            BuildSystem::Gradle
        };
        Some((build_system, path))
    })
}

/// Java sources under `src/main/java`, relative to that directory
pub fn find_main_sources(root: &Path) -> Vec<PathBuf> {
    let source_root = root.join("src").join("main").join("java");
    if !source_root.is_dir() {
        return Vec::new();
    }

    let mut sources: Vec<PathBuf> = WalkDir::new(&source_root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_ignored(e))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "java"))
        .filter_map(|e| e.path().strip_prefix(&source_root).ok().map(Path::to_path_buf))
        .collect();
    sources.sort();
    sources
}

/// Directories never copied, diffed or scanned
pub(crate) fn is_ignored(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(is_ignored_name)
        .unwrap_or(false)
}

pub(crate) fn is_ignored_name(name: &str) -> bool {
    name.starts_with('.') || name == "target" || name == "build" || name == "out"
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn test_maven_wins_over_gradle() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "build.gradle");
        touch(dir.path(), "pom.xml");
        let (build_system, path) = detect_build_file(dir.path()).unwrap();
        assert_eq!(build_system, BuildSystem::Maven);
        assert!(path.ends_with("pom.xml"));
    }

    #[test]
    fn test_groovy_before_kotlin_dsl() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "build.gradle.kts");
        touch(dir.path(), "build.gradle");
        let (_, path) = detect_build_file(dir.path()).unwrap();
        assert!(path.ends_with("build.gradle"));
    }

    #[test]
    fn test_no_build_file() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "README.md");
        assert!(detect_build_file(dir.path()).is_none());
    }

    #[test]
    fn test_main_sources_skip_hidden_and_non_java() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/main/java/com/acme/Service.java");
        touch(dir.path(), "src/main/java/com/acme/notes.txt");
        touch(dir.path(), "src/main/java/.cache/Gen.java");
        let sources = find_main_sources(dir.path());
        assert_eq!(sources, vec![PathBuf::from("com/acme/Service.java")]);
    }
}
