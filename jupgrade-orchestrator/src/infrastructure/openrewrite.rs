//! OpenRewrite recipe execution through the project's build tool

use std::io::Write;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use jupgrade_core::application::errors::UpgradeError;
use jupgrade_core::config::{BuildConfig, OpenRewriteConfig};
use jupgrade_core::domain::project::{BuildSystem, ProjectInfo};
use jupgrade_core::infrastructure::{CommandSpec, ProcessError, run_command};

use super::build_tool::resolve_executable;
use crate::domain::services::{ProgressReporter, RecipeRunner};
use crate::domain::value_objects::ProgressStep;

/// Runs each recipe as a separate build tool invocation
pub struct OpenRewriteRunner {
    config: OpenRewriteConfig,
    prefer_wrapper: bool,
}

impl OpenRewriteRunner {
    pub fn new(config: OpenRewriteConfig, build: &BuildConfig) -> Self {
        Self {
            config,
            prefer_wrapper: build.prefer_wrapper,
        }
    }

    fn maven_args(&self, recipe: &str, enable_preview: bool) -> Vec<String> {
        let mut args = vec![
            "-B".to_string(),
            format!(
                "org.openrewrite.maven:rewrite-maven-plugin:{}:run",
                self.config.maven_plugin_version
            ),
            format!(
                "-Drewrite.recipeArtifactCoordinates={}",
                self.config.recipe_artifacts.join(",")
            ),
            format!("-Drewrite.activeRecipes={}", recipe),
        ];
        if enable_preview {
            args.push("-Dmaven.compiler.enablePreview=true".to_string());
        }
        args
    }

    /// Init script that applies the OpenRewrite plugin to every project
    fn gradle_init_script(&self) -> String {
        let mut script = String::new();
        script.push_str("initscript {\n");
        script.push_str("    repositories { maven { url \"https://plugins.gradle.org/m2\" } }\n");
        script.push_str(&format!(
            "    dependencies {{ classpath(\"org.openrewrite:plugin:{}\") }}\n",
            self.config.gradle_plugin_version
        ));
        script.push_str("}\n\n");
        script.push_str("rootProject {\n");
        script.push_str("    plugins.apply(org.openrewrite.gradle.RewritePlugin)\n");
        script.push_str("    dependencies {\n");
        for artifact in &self.config.recipe_artifacts {
            script.push_str(&format!("        rewrite(\"{}\")\n", gradle_coordinate(artifact)));
        }
        script.push_str("    }\n");
        script.push_str("    afterEvaluate {\n");
        script.push_str("        if (repositories.isEmpty()) { repositories { mavenCentral() } }\n");
        script.push_str("    }\n");
        script.push_str("}\n");
        script
    }

    fn write_init_script(&self) -> Result<tempfile::NamedTempFile, UpgradeError> {
        let mut file = tempfile::Builder::new()
            .prefix("jupgrade-rewrite-")
            .suffix(".gradle")
            .tempfile()?;
        file.write_all(self.gradle_init_script().as_bytes())?;
        file.flush()?;
        Ok(file)
    }
}

/// Gradle resolves `latest.release` where Maven uses `RELEASE`
fn gradle_coordinate(artifact: &str) -> String {
    match artifact.strip_suffix(":RELEASE") {
        Some(base) => format!("{}:latest.release", base),
        None => artifact.to_string(),
    }
}

#[async_trait]
impl RecipeRunner for OpenRewriteRunner {
    #[instrument(skip_all, fields(root = %project.root.display(), recipes = recipes.len()))]
    async fn apply_recipes(
        &self,
        project: &ProjectInfo,
        recipes: &[String],
        enable_preview: bool,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<(), UpgradeError> {
        let executable = resolve_executable(project, self.prefer_wrapper);
        // Kept alive until every Gradle invocation has finished
        let init_script = match project.build_system {
            BuildSystem::Gradle => Some(self.write_init_script()?),
            BuildSystem::Maven => None,
        };

        for (index, recipe) in recipes.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(UpgradeError::Cancelled);
            }
            progress.step(&ProgressStep::ApplyingRecipe {
                index: index + 1,
                total: recipes.len(),
                recipe: recipe.clone(),
            });

            let args = match &init_script {
                Some(script) => vec![
                    "--console=plain".to_string(),
                    "--init-script".to_string(),
                    script.path().display().to_string(),
                    "rewriteRun".to_string(),
                    format!("-Drewrite.activeRecipe={}", recipe),
                ],
                None => self.maven_args(recipe, enable_preview),
            };

            let spec = CommandSpec::new(executable.clone(), &project.root)
                .args(args)
                .timeout(self.config.timeout());

            let program = spec.display_name();
            run_command(&spec, cancel)
                .await
                .and_then(|output| output.into_result(&program))
                .map_err(|e| match e {
                    ProcessError::Cancelled { .. } => UpgradeError::Cancelled,
                    other => UpgradeError::recipe_failure(recipe.as_str(), other),
                })?;

            info!(recipe = %recipe, "Recipe applied");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::LogProgress;

    fn runner() -> OpenRewriteRunner {
        OpenRewriteRunner::new(OpenRewriteConfig::default(), &BuildConfig::default())
    }

    #[test]
    fn test_maven_arguments() {
        let args = runner().maven_args("org.openrewrite.java.migrate.UpgradeToJava17", false);
        assert_eq!(args[0], "-B");
        assert!(args[1].starts_with("org.openrewrite.maven:rewrite-maven-plugin:"));
        assert!(args[1].ends_with(":run"));
        assert!(args[2].contains("rewrite-migrate-java"));
        assert_eq!(
            args[3],
            "-Drewrite.activeRecipes=org.openrewrite.java.migrate.UpgradeToJava17"
        );
    }

    #[test]
    fn test_gradle_init_script_lists_recipe_artifacts() {
        let script = runner().gradle_init_script();
        assert!(script.contains("org.openrewrite:plugin:latest.release"));
        assert!(script.contains("rewrite(\"org.openrewrite.recipe:rewrite-spring:latest.release\")"));
        assert!(script.contains("RewritePlugin"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_first_failing_recipe_stops_the_run() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("calls.log");
        let wrapper = dir.path().join("mvnw");
        std::fs::write(
            &wrapper,
            format!(
                "#!/bin/sh\necho \"$4\" >> {}\ncase \"$4\" in *Bad*) exit 2;; esac\n",
                log.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&wrapper, std::fs::Permissions::from_mode(0o755)).unwrap();

        let project = ProjectInfo {
            root: dir.path().to_path_buf(),
            build_system: BuildSystem::Maven,
            manifest_path: dir.path().join("pom.xml"),
            current_java_version: "8".into(),
            dependencies: vec![],
            framework_version: None,
        };
        let recipes = vec!["Good".to_string(), "Bad".to_string(), "Never".to_string()];

        let err = runner()
            .apply_recipes(&project, &recipes, false, &LogProgress, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            UpgradeError::RecipeApplicationFailure { recipe, .. } => assert_eq!(recipe, "Bad"),
            other => panic!("unexpected error: {other}"),
        }
        let calls = std::fs::read_to_string(log).unwrap();
        assert_eq!(calls.lines().count(), 2);
    }
}
