//! Maven / Gradle invocation for compile and test

use std::path::PathBuf;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use jupgrade_core::application::errors::UpgradeError;
use jupgrade_core::config::BuildConfig;
use jupgrade_core::domain::project::{BuildSystem, ProjectInfo};
use jupgrade_core::infrastructure::{CommandSpec, run_command};

use crate::domain::services::BuildRunner;

/// Wrapper script in the project root when preferred and present, else the
/// tool on `PATH`
pub fn resolve_executable(project: &ProjectInfo, prefer_wrapper: bool) -> PathBuf {
    let wrapper = project.root.join(project.build_system.wrapper_script());
    if prefer_wrapper && wrapper.is_file() {
        wrapper
    } else {
        PathBuf::from(project.build_system.executable())
    }
}

/// Arguments for one build goal
fn goal_args(build_system: BuildSystem, goal: Goal, enable_preview: bool) -> Vec<String> {
    let mut args: Vec<String> = match (build_system, goal) {
        (BuildSystem::Maven, Goal::Compile) => vec!["-B".into(), "compile".into()],
        (BuildSystem::Maven, Goal::Test) => vec!["-B".into(), "test".into()],
        (BuildSystem::Gradle, Goal::Compile) => {
            vec!["--console=plain".into(), "compileJava".into()]
        }
        (BuildSystem::Gradle, Goal::Test) => vec!["--console=plain".into(), "test".into()],
    };
    if enable_preview && build_system == BuildSystem::Maven {
        args.push("-Dmaven.compiler.enablePreview=true".into());
    }
    args
}

#[derive(Debug, Clone, Copy)]
enum Goal {
    Compile,
    Test,
}

/// Runs the project's build tool as a child process
pub struct ProcessBuildRunner {
    config: BuildConfig,
}

impl ProcessBuildRunner {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    async fn run_goal(
        &self,
        project: &ProjectInfo,
        goal: Goal,
        enable_preview: bool,
        cancel: &CancellationToken,
    ) -> Result<bool, UpgradeError> {
        if enable_preview && project.build_system == BuildSystem::Gradle {
            warn!("Preview features must be enabled in build.gradle; running without them");
        }

        let spec = CommandSpec::new(
            resolve_executable(project, self.config.prefer_wrapper),
            &project.root,
        )
        .args(goal_args(project.build_system, goal, enable_preview))
        .timeout(self.config.timeout());

        let output = run_command(&spec, cancel).await?;
        if output.success {
            info!(goal = ?goal, "Build goal succeeded");
        } else {
            warn!(goal = ?goal, code = ?output.code, tail = %output.tail(20), "Build goal failed");
        }
        Ok(output.success)
    }
}

#[async_trait]
impl BuildRunner for ProcessBuildRunner {
    #[instrument(skip_all, fields(root = %project.root.display()))]
    async fn compile(
        &self,
        project: &ProjectInfo,
        enable_preview: bool,
        cancel: &CancellationToken,
    ) -> Result<bool, UpgradeError> {
        self.run_goal(project, Goal::Compile, enable_preview, cancel)
            .await
    }

    #[instrument(skip_all, fields(root = %project.root.display()))]
    async fn test(
        &self,
        project: &ProjectInfo,
        enable_preview: bool,
        cancel: &CancellationToken,
    ) -> Result<bool, UpgradeError> {
        self.run_goal(project, Goal::Test, enable_preview, cancel)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(root: &std::path::Path, build_system: BuildSystem) -> ProjectInfo {
        ProjectInfo {
            root: root.to_path_buf(),
            build_system,
            manifest_path: root.join("pom.xml"),
            current_java_version: "17".into(),
            dependencies: vec![],
            framework_version: None,
        }
    }

    #[test]
    fn test_wrapper_preferred_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let project = project(dir.path(), BuildSystem::Gradle);
        assert_eq!(resolve_executable(&project, true), PathBuf::from("gradle"));

        std::fs::write(dir.path().join("gradlew"), "#!/bin/sh\n").unwrap();
        assert_eq!(resolve_executable(&project, true), dir.path().join("gradlew"));
        assert_eq!(resolve_executable(&project, false), PathBuf::from("gradle"));
    }

    #[test]
    fn test_preview_flag_only_for_maven() {
        let maven = goal_args(BuildSystem::Maven, Goal::Compile, true);
        assert!(maven.contains(&"-Dmaven.compiler.enablePreview=true".to_string()));
        let gradle = goal_args(BuildSystem::Gradle, Goal::Test, true);
        assert_eq!(gradle, vec!["--console=plain", "test"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_build_is_not_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let wrapper = dir.path().join("mvnw");
        std::fs::write(&wrapper, "#!/bin/sh\necho 'COMPILATION ERROR' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&wrapper, std::fs::Permissions::from_mode(0o755)).unwrap();

        let runner = ProcessBuildRunner::new(BuildConfig::default());
        let ok = runner
            .compile(
                &project(dir.path(), BuildSystem::Maven),
                false,
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(!ok);
    }
}
