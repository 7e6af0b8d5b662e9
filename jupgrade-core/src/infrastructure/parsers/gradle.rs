//! Gradle build script parser (Groovy and Kotlin DSL)

use std::collections::HashMap;

use super::traits::{ManifestParser, ParsedManifest};
use crate::application::errors::ParseError;
use crate::domain::project::{BuildSystem, DependencyCoordinate};
use crate::domain::version::normalize_java_version;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

/// Dependency configurations recognized in `dependencies { }` blocks
pub(crate) const CONFIGURATIONS: &str = "implementation|api|compile|compileOnly|runtime|runtimeOnly|testImplementation|testCompile|testCompileOnly|testRuntimeOnly|annotationProcessor|kapt|developmentOnly|classpath";

// implementation 'g:a:v' / implementation("g:a:v")
pub(crate) static RE_STRING_COORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"\b({})\s*\(?\s*['"]([^:'"\s]+):([^:'"\s]+)(?::([^:'"\s]+))?(?::[^'"\s]*)?['"]"#,
        CONFIGURATIONS
    ))
    .unwrap()
});

// implementation group: 'g', name: 'a', version: 'v' / implementation(group = "g", name = "a", version = "v")
pub(crate) static RE_MAP_COORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"\b({})\s*\(?\s*group\s*[:=]\s*['"]([^'"]+)['"]\s*,\s*name\s*[:=]\s*['"]([^'"]+)['"](?:\s*,\s*version\s*[:=]\s*['"]([^'"]+)['"])?"#,
        CONFIGURATIONS
    ))
    .unwrap()
});

// def springVersion = '5.3.0' / val springVersion = "5.3.0" / ext.springVersion = '5.3.0'
pub(crate) static RE_VARIABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*(?:def\s+|val\s+|var\s+|ext\.|set\(\s*['"])?([A-Za-z_][\w.]*)['"]?\s*[=,]\s*['"]([^'"$]+)['"]"#)
        .unwrap()
});

static RE_SOURCE_COMPAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"sourceCompatibility\s*=\s*(?:JavaVersion\.)?['"]?(VERSION_[\d_]+|[\d.]+)"#)
        .unwrap()
});

static RE_TARGET_COMPAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"targetCompatibility\s*=\s*(?:JavaVersion\.)?['"]?(VERSION_[\d_]+|[\d.]+)"#)
        .unwrap()
});

static RE_JAVA_VERSION_CONST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"JavaVersion\.(VERSION_[\d_]+)").unwrap());

static RE_TOOLCHAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"JavaLanguageVersion\.of\(\s*['"]?(\d+)['"]?\s*\)"#).unwrap());

static RE_JVM_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"jvmTarget\s*(?:=|\.set\()\s*(?:JvmTarget\.JVM_)?['"]?([\d._]+)"#).unwrap()
});

static RE_BOOT_PLUGIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"id\s*\(?\s*['"]org\.springframework\.boot['"]\s*\)?\s*version\s*\(?\s*['"]([^'"]+)['"]"#)
        .unwrap()
});

/// Extract the variable name from `$name` or `${name}`
pub(crate) fn variable_reference(version: &str) -> Option<&str> {
    let v = version.trim();
    if let Some(inner) = v.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        return Some(inner.trim_start_matches("project.").trim_start_matches("rootProject.ext."));
    }
    v.strip_prefix('$')
        .filter(|name| name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.'))
}

/// Parser for Gradle build files
pub struct GradleParser;

impl Default for GradleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GradleParser {
    pub fn new() -> Self {
        Self
    }

    fn extract_variables(&self, content: &str) -> HashMap<String, String> {
        RE_VARIABLE
            .captures_iter(content)
            .map(|caps| {
                let name = caps[1].trim_start_matches("ext.").to_string();
                (name, caps[2].to_string())
            })
            .collect()
    }

    /// Extract dependencies from both notations, merged in source order
    fn extract_dependencies(
        &self,
        content: &str,
        variables: &HashMap<String, String>,
    ) -> Vec<DependencyCoordinate> {
        let mut found: Vec<(usize, DependencyCoordinate)> = Vec::new();

        for pattern in [&*RE_STRING_COORD, &*RE_MAP_COORD] {
            for caps in pattern.captures_iter(content) {
                let Some(whole) = caps.get(0) else { continue };
                let configuration = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                let group_id = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
                let artifact_id = caps.get(3).map(|m| m.as_str().trim()).unwrap_or_default();
                let raw_version = caps.get(4).map(|m| m.as_str().trim()).unwrap_or_default();

                if group_id.is_empty() || artifact_id.is_empty() {
                    continue;
                }

                let variable = variable_reference(raw_version);
                let version = variable
                    .and_then(|name| variables.get(name))
                    .cloned()
                    .unwrap_or_else(|| raw_version.to_string());

                let mut coordinate = DependencyCoordinate::new(group_id, artifact_id, version)
                    .with_scope(configuration);
                if let Some(name) = variable {
                    coordinate = coordinate.with_version_property(name);
                }
                found.push((whole.start(), coordinate));
            }
        }

        found.sort_by_key(|(offset, _)| *offset);
        found.into_iter().map(|(_, coordinate)| coordinate).collect()
    }

    fn extract_java_version(&self, content: &str) -> Option<String> {
        [
            &*RE_SOURCE_COMPAT,
            &*RE_TARGET_COMPAT,
            &*RE_JAVA_VERSION_CONST,
            &*RE_TOOLCHAIN,
            &*RE_JVM_TARGET,
        ]
        .iter()
        .find_map(|re| {
            re.captures(content)
                .and_then(|caps| normalize_java_version(&caps[1]))
        })
    }

    fn extract_framework_version(
        &self,
        content: &str,
        dependencies: &[DependencyCoordinate],
    ) -> Option<String> {
        if let Some(caps) = RE_BOOT_PLUGIN.captures(content) {
            return Some(caps[1].to_string());
        }

        dependencies
            .iter()
            .find(|d| {
                d.group_id == "org.springframework.boot"
                    && d.artifact_id.starts_with("spring-boot")
                    && d.has_resolved_version()
            })
            .map(|d| d.version.clone())
    }
}

#[async_trait]
impl ManifestParser for GradleParser {
    fn supports_file(&self, filename: &str) -> bool {
        filename == "build.gradle" || filename == "build.gradle.kts"
    }

    async fn parse_file(&self, content: &str) -> Result<ParsedManifest, ParseError> {
        let variables = self.extract_variables(content);
        let dependencies = self.extract_dependencies(content, &variables);
        let java_version = self.extract_java_version(content);
        let framework_version = self.extract_framework_version(content, &dependencies);

        tracing::debug!(
            dependencies = dependencies.len(),
            java_version = ?java_version,
            framework_version = ?framework_version,
            "Parsed Gradle build script"
        );

        Ok(ParsedManifest {
            dependencies,
            java_version,
            framework_version,
        })
    }

    fn build_system(&self) -> BuildSystem {
        BuildSystem::Gradle
    }
}
