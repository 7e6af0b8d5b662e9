//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::project::BuildSystem;

/// Name of the per-workspace configuration file
pub const WORKSPACE_CONFIG_FILE: &str = ".jupgrade.toml";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub upgrade: UpgradeConfig,
    pub security: SecurityConfig,
    pub apis: ApiConfig,
    pub openrewrite: OpenRewriteConfig,
    pub build: BuildConfig,
    pub git: GitConfig,
    pub state: StateConfig,
    pub logging: LoggingConfig,
}

/// Upgrade behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeConfig {
    /// Highest Java version a plan may target
    pub target_java_version: String,
    pub enable_preview_features: bool,
    /// Overrides the built-in framework version table when set
    pub target_framework_version: Option<String>,
    pub build_tool: BuildSystem,
    /// Extra OpenRewrite recipes appended after the built-in ones
    pub custom_recipes: Vec<String>,
    pub skip_tests: bool,
    pub backup_before_upgrade: bool,
    /// Allow pre-release and snapshot versions when resolving dependency updates
    pub allow_prereleases: bool,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            target_java_version: "17".to_string(),
            enable_preview_features: false,
            target_framework_version: None,
            build_tool: BuildSystem::Maven,
            custom_recipes: Vec::new(),
            skip_tests: false,
            backup_before_upgrade: true,
            allow_prereleases: false,
        }
    }
}

/// Vulnerability check settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub enable_cve_check: bool,
    pub min_severity_level: String,
    pub ignore_vulnerabilities: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_cve_check: true,
            min_severity_level: "MEDIUM".to_string(),
            ignore_vulnerabilities: Vec::new(),
        }
    }
}

/// External API configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApiConfig {
    pub maven_central: MavenCentralConfig,
    pub nvd: NvdConfig,
}

/// Maven Central search API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MavenCentralConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Maximum number of versions requested per artifact
    pub max_rows: u32,
}

impl Default for MavenCentralConfig {
    fn default() -> Self {
        Self {
            base_url: "https://search.maven.org".to_string(),
            timeout_seconds: 30,
            max_rows: 200,
        }
    }
}

impl MavenCentralConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// NVD API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NvdConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    /// Requests allowed per rolling 30 second window (0 disables pacing)
    pub rate_limit_per_30s: u32,
    pub results_per_page: u32,
}

impl Default for NvdConfig {
    fn default() -> Self {
        Self {
            base_url: "https://services.nvd.nist.gov".to_string(),
            api_key: None,
            timeout_seconds: 30,
            rate_limit_per_30s: 5,
            results_per_page: 50,
        }
    }
}

impl NvdConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Delay to wait between consecutive requests
    pub fn request_interval(&self) -> Duration {
        if self.rate_limit_per_30s == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(30_000 / u64::from(self.rate_limit_per_30s))
        }
    }
}

/// OpenRewrite invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRewriteConfig {
    pub maven_plugin_version: String,
    pub gradle_plugin_version: String,
    /// Recipe modules made available to every run
    pub recipe_artifacts: Vec<String>,
    pub timeout_seconds: u64,
}

impl Default for OpenRewriteConfig {
    fn default() -> Self {
        Self {
            maven_plugin_version: "5.46.1".to_string(),
            gradle_plugin_version: "latest.release".to_string(),
            recipe_artifacts: vec![
                "org.openrewrite.recipe:rewrite-migrate-java:RELEASE".to_string(),
                "org.openrewrite.recipe:rewrite-static-analysis:RELEASE".to_string(),
                "org.openrewrite.recipe:rewrite-spring:RELEASE".to_string(),
            ],
            timeout_seconds: 1800,
        }
    }
}

impl OpenRewriteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Build and test command settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub timeout_seconds: u64,
    /// Prefer mvnw/gradlew when present in the project root
    pub prefer_wrapper: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 1800,
            prefer_wrapper: true,
        }
    }
}

impl BuildConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Version-control checkpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub enabled: bool,
    pub branch_prefix: String,
    pub tag_prefix: String,
    pub stash_uncommitted: bool,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            branch_prefix: "jupgrade/upgrade".to_string(),
            tag_prefix: "jupgrade-checkpoint".to_string(),
            stash_uncommitted: true,
        }
    }
}

/// Persisted state settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Explicit state file; defaults to the platform data directory
    pub path: Option<PathBuf>,
    pub max_history_entries: usize,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_history_entries: 100,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::build(None, None)
    }

    /// Load configuration including the workspace's `.jupgrade.toml` and an
    /// optional explicit file, which takes precedence over every other file.
    pub fn load_for_workspace(
        workspace: &Path,
        explicit: Option<&Path>,
    ) -> Result<Self, ConfigLoadError> {
        Self::build(Some(workspace), explicit)
    }

    fn build(workspace: Option<&Path>, explicit: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        // Add environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        builder = builder.add_source(config::File::with_name("config/local").required(false));

        if let Some(workspace) = workspace {
            builder = builder.add_source(
                config::File::from(workspace.join(WORKSPACE_CONFIG_FILE))
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }

        if let Some(path) = explicit {
            builder = builder.add_source(config::File::from(path.to_path_buf()).required(true));
        }

        // Environment variables last (highest priority)
        builder = builder.add_source(
            config::Environment::with_prefix("JUPGRADE")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("upgrade.custom_recipes")
                .with_list_parse_key("security.ignore_vulnerabilities")
                .try_parsing(true),
        );

        let config: Config = builder.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.upgrade.target_java_version, "17");
        assert!(!config.upgrade.enable_preview_features);
        assert_eq!(config.upgrade.build_tool, BuildSystem::Maven);
        assert!(config.upgrade.custom_recipes.is_empty());
        assert!(!config.upgrade.skip_tests);
        assert!(config.upgrade.backup_before_upgrade);
        assert!(config.security.enable_cve_check);
        assert_eq!(config.security.min_severity_level, "MEDIUM");
        assert_eq!(config.state.max_history_entries, 100);
    }

    #[test]
    fn test_workspace_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            temp.path().join(WORKSPACE_CONFIG_FILE),
            r#"
[upgrade]
target_java_version = "21"
skip_tests = true
custom_recipes = ["com.example.MyRecipe"]

[security]
min_severity_level = "HIGH"
"#,
        )
        .unwrap();

        let config = Config::load_for_workspace(temp.path(), None).unwrap();
        assert_eq!(config.upgrade.target_java_version, "21");
        assert!(config.upgrade.skip_tests);
        assert_eq!(config.upgrade.custom_recipes, vec!["com.example.MyRecipe"]);
        assert_eq!(config.security.min_severity_level, "HIGH");
        // untouched sections keep their defaults
        assert!(config.upgrade.backup_before_upgrade);
    }

    #[test]
    fn test_invalid_workspace_file_fails_validation() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            temp.path().join(WORKSPACE_CONFIG_FILE),
            "[security]\nmin_severity_level = \"SEVERE\"\n",
        )
        .unwrap();

        let err = Config::load_for_workspace(temp.path(), None).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Validation(_)));
    }

    #[test]
    fn test_nvd_request_interval() {
        let mut nvd = NvdConfig::default();
        assert_eq!(nvd.request_interval(), Duration::from_secs(6));
        nvd.rate_limit_per_30s = 0;
        assert_eq!(nvd.request_interval(), Duration::ZERO);
    }
}
