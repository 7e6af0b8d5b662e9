//! Configuration validation module

use crate::config::{
    ApiConfig, BuildConfig, Config, LoggingConfig, OpenRewriteConfig, SecurityConfig, StateConfig,
    UpgradeConfig,
};
use crate::domain::vulnerability::Severity;

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Upgrade configuration error: {message}")]
    Upgrade { message: String },

    #[error("Security configuration error: {message}")]
    Security { message: String },

    #[error("API configuration error: {message}")]
    Api { message: String },

    #[error("OpenRewrite configuration error: {message}")]
    OpenRewrite { message: String },

    #[error("Build configuration error: {message}")]
    Build { message: String },

    #[error("State configuration error: {message}")]
    State { message: String },

    #[error("Logging configuration error: {message}")]
    Logging { message: String },
}

impl ValidationError {
    pub fn upgrade(message: impl Into<String>) -> Self {
        Self::Upgrade {
            message: message.into(),
        }
    }

    pub fn security(message: impl Into<String>) -> Self {
        Self::Security {
            message: message.into(),
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    pub fn openrewrite(message: impl Into<String>) -> Self {
        Self::OpenRewrite {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }
}

impl Validate for UpgradeConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        let major = self
            .target_java_version
            .trim()
            .parse::<u32>()
            .map_err(|_| {
                ValidationError::upgrade(format!(
                    "target_java_version must be a Java feature release number, got '{}'",
                    self.target_java_version
                ))
            })?;

        if major < 8 {
            return Err(ValidationError::upgrade(format!(
                "target_java_version must be 8 or newer, got {}",
                major
            )));
        }

        if let Some(framework) = &self.target_framework_version {
            if framework.trim().is_empty() {
                return Err(ValidationError::upgrade(
                    "target_framework_version cannot be empty when set",
                ));
            }
        }

        if let Some(recipe) = self.custom_recipes.iter().find(|r| r.trim().is_empty()) {
            return Err(ValidationError::upgrade(format!(
                "custom_recipes contains an empty recipe name: '{}'",
                recipe
            )));
        }

        Ok(())
    }
}

impl Validate for SecurityConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        self.min_severity_level
            .parse::<Severity>()
            .map(|_| ())
            .map_err(|_| {
                ValidationError::security(format!(
                    "min_severity_level must be one of LOW, MEDIUM, HIGH, CRITICAL; got '{}'",
                    self.min_severity_level
                ))
            })
    }
}

impl Validate for ApiConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        for (name, url) in [
            ("maven_central", &self.maven_central.base_url),
            ("nvd", &self.nvd.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ValidationError::api(format!(
                    "{} base_url must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        if self.maven_central.timeout_seconds == 0 || self.nvd.timeout_seconds == 0 {
            return Err(ValidationError::api(
                "API timeouts must be greater than 0 seconds",
            ));
        }

        if self.maven_central.max_rows == 0 {
            return Err(ValidationError::api(
                "maven_central.max_rows must be greater than 0",
            ));
        }

        if self.nvd.results_per_page == 0 || self.nvd.results_per_page > 2000 {
            return Err(ValidationError::api(format!(
                "nvd.results_per_page must be in range 1-2000, got {}",
                self.nvd.results_per_page
            )));
        }

        Ok(())
    }
}

impl Validate for OpenRewriteConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.maven_plugin_version.trim().is_empty() {
            return Err(ValidationError::openrewrite(
                "maven_plugin_version cannot be empty",
            ));
        }

        if self.timeout_seconds == 0 {
            return Err(ValidationError::openrewrite(
                "timeout_seconds must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Validate for BuildConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_seconds == 0 {
            return Err(ValidationError::build(
                "timeout_seconds must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Validate for StateConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_history_entries == 0 {
            return Err(ValidationError::state(
                "max_history_entries must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.level.trim().is_empty() {
            return Err(ValidationError::logging("level cannot be empty"));
        }
        Ok(())
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.upgrade.validate()?;
        self.security.validate()?;
        self.apis.validate()?;
        self.openrewrite.validate()?;
        self.build.validate()?;
        self.state.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_numeric_java_target() {
        let config = UpgradeConfig {
            target_java_version: "seventeen".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::Upgrade { .. })
        ));
    }

    #[test]
    fn test_rejects_ancient_java_target() {
        let config = UpgradeConfig {
            target_java_version: "7".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_severity_level_is_case_insensitive() {
        let config = SecurityConfig {
            min_severity_level: "high".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = ApiConfig::default();
        config.nvd.base_url = "ftp://nvd.example".to_string();
        assert!(matches!(config.validate(), Err(ValidationError::Api { .. })));
    }

    #[test]
    fn test_rejects_zero_history_retention() {
        let config = StateConfig {
            path: None,
            max_history_entries: 0,
        };
        assert!(config.validate().is_err());
    }
}
