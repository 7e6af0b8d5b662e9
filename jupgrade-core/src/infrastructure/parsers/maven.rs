//! Maven pom.xml parser

use std::collections::HashMap;

use super::traits::{ManifestParser, ParsedManifest};
use crate::application::errors::ParseError;
use crate::domain::project::{BuildSystem, DependencyCoordinate};
use crate::domain::version::normalize_java_version;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;

static RE_PROPERTY_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// Properties consulted for the Java version, in priority order
const JAVA_VERSION_PROPERTIES: [&str; 4] = [
    "maven.compiler.release",
    "maven.compiler.source",
    "maven.compiler.target",
    "java.version",
];

const SPRING_BOOT_GROUP: &str = "org.springframework.boot";
const SPRING_BOOT_PARENT: &str = "spring-boot-starter-parent";
const COMPILER_PLUGIN: &str = "maven-compiler-plugin";

/// Property name when the whole version is a single `${name}` reference
pub(crate) fn property_reference(version: &str) -> Option<&str> {
    version
        .trim()
        .strip_prefix("${")
        .and_then(|v| v.strip_suffix('}'))
        .filter(|name| !name.is_empty() && !name.contains(['$', '{', '}']))
}

/// Parser for Maven pom.xml files
pub struct MavenParser;

impl Default for MavenParser {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct RawDependency {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    scope: Option<String>,
}

#[derive(Debug, Default)]
struct RawPlugin {
    artifact_id: Option<String>,
    configuration: HashMap<String, String>,
}

/// The parts of a pom this tool cares about, before property resolution
#[derive(Debug, Default)]
struct PomModel {
    properties: HashMap<String, String>,
    group_id: Option<String>,
    project_version: Option<String>,
    parent_group_id: Option<String>,
    parent_artifact_id: Option<String>,
    parent_version: Option<String>,
    dependencies: Vec<RawDependency>,
    compiler_configuration: HashMap<String, String>,
}

impl PomModel {
    fn record_text(
        &mut self,
        path: &[&str],
        text: String,
        dependency: &mut Option<RawDependency>,
        plugin: &mut Option<RawPlugin>,
    ) {
        match path {
            ["project", "properties", key] => {
                self.properties.insert((*key).to_string(), text);
            }
            ["project", "groupId"] => self.group_id = Some(text),
            ["project", "version"] => self.project_version = Some(text),
            ["project", "parent", "groupId"] => self.parent_group_id = Some(text),
            ["project", "parent", "artifactId"] => self.parent_artifact_id = Some(text),
            ["project", "parent", "version"] => self.parent_version = Some(text),
            [.., "dependency", field] => {
                if let Some(dep) = dependency.as_mut() {
                    match *field {
                        "groupId" => dep.group_id = Some(text),
                        "artifactId" => dep.artifact_id = Some(text),
                        "version" => dep.version = Some(text),
                        "scope" => dep.scope = Some(text),
                        _ => {}
                    }
                }
            }
            [.., "plugin", "artifactId"] => {
                if let Some(p) = plugin.as_mut() {
                    p.artifact_id = Some(text);
                }
            }
            [.., "plugin", "configuration", key] => {
                if let Some(p) = plugin.as_mut() {
                    p.configuration.insert((*key).to_string(), text);
                }
            }
            _ => {}
        }
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "project.version" | "pom.version" | "version" => self
                .project_version
                .as_deref()
                .or(self.parent_version.as_deref()),
            "project.groupId" | "pom.groupId" => {
                self.group_id.as_deref().or(self.parent_group_id.as_deref())
            }
            "project.parent.version" | "parent.version" => self.parent_version.as_deref(),
            _ => self.properties.get(name).map(String::as_str),
        }
    }

    /// Substitute `${name}` references; unresolved references stay as written
    fn resolve(&self, value: &str) -> String {
        let mut current = value.to_string();
        // Properties may reference other properties
        for _ in 0..5 {
            if !current.contains("${") {
                break;
            }
            let next = RE_PROPERTY_REF
                .replace_all(&current, |caps: &regex::Captures| {
                    self.lookup(&caps[1])
                        .map(str::to_string)
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn java_version(&self) -> Option<String> {
        let from_properties = JAVA_VERSION_PROPERTIES
            .iter()
            .filter_map(|key| self.properties.get(*key));
        let from_plugin = ["release", "source", "target"]
            .iter()
            .filter_map(|key| self.compiler_configuration.get(*key));

        from_properties
            .chain(from_plugin)
            .find_map(|raw| normalize_java_version(&self.resolve(raw)))
    }

    fn framework_version(&self, dependencies: &[DependencyCoordinate]) -> Option<String> {
        if self.parent_artifact_id.as_deref() == Some(SPRING_BOOT_PARENT) {
            if let Some(version) = &self.parent_version {
                return Some(self.resolve(version));
            }
        }

        dependencies
            .iter()
            .find(|d| {
                d.group_id == SPRING_BOOT_GROUP
                    && d.artifact_id.starts_with("spring-boot")
                    && d.has_resolved_version()
            })
            .map(|d| d.version.clone())
    }
}

impl MavenParser {
    pub fn new() -> Self {
        Self
    }

    fn read_model(&self, content: &str) -> Result<PomModel, ParseError> {
        let mut reader = Reader::from_str(content);
        let mut buf = Vec::new();
        let mut model = PomModel::default();
        let mut path: Vec<String> = Vec::new();
        let mut dependency: Option<RawDependency> = None;
        let mut plugin: Option<RawPlugin> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    match name.as_str() {
                        "dependency" => dependency = Some(RawDependency::default()),
                        "plugin" => plugin = Some(RawPlugin::default()),
                        _ => {}
                    }
                    path.push(name);
                }
                Ok(Event::End(_)) => match path.pop().as_deref() {
                    Some("dependency") => {
                        if let Some(dep) = dependency.take() {
                            model.dependencies.push(dep);
                        }
                    }
                    Some("plugin") => {
                        if let Some(p) = plugin.take() {
                            if p.artifact_id.as_deref() == Some(COMPILER_PLUGIN) {
                                model.compiler_configuration = p.configuration;
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(t)) => {
                    let text = t
                        .unescape()
                        .map(|s| s.trim().to_string())
                        .unwrap_or_default();
                    if !text.is_empty() {
                        let segments: Vec<&str> = path.iter().map(String::as_str).collect();
                        model.record_text(&segments, text, &mut dependency, &mut plugin);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(ParseError::Xml {
                        position: reader.buffer_position() as usize,
                        message: e.to_string(),
                    });
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(model)
    }
}

#[async_trait]
impl ManifestParser for MavenParser {
    fn supports_file(&self, filename: &str) -> bool {
        filename == "pom.xml"
    }

    async fn parse_file(&self, content: &str) -> Result<ParsedManifest, ParseError> {
        let model = self.read_model(content)?;

        let dependencies: Vec<DependencyCoordinate> = model
            .dependencies
            .iter()
            .filter_map(|raw| {
                let group_id = model.resolve(raw.group_id.as_deref()?);
                let artifact_id = model.resolve(raw.artifact_id.as_deref()?);
                let version = raw
                    .version
                    .as_deref()
                    .map(|v| model.resolve(v))
                    .unwrap_or_default();
                let mut coordinate = DependencyCoordinate::new(group_id, artifact_id, version);
                if let Some(scope) = &raw.scope {
                    coordinate = coordinate.with_scope(scope.clone());
                }
                if let Some(property) = raw.version.as_deref().and_then(property_reference) {
                    coordinate = coordinate.with_version_property(property);
                }
                Some(coordinate)
            })
            .collect();

        let java_version = model.java_version();
        let framework_version = model.framework_version(&dependencies);

        tracing::debug!(
            dependencies = dependencies.len(),
            java_version = ?java_version,
            framework_version = ?framework_version,
            "Parsed pom.xml"
        );

        Ok(ParsedManifest {
            dependencies,
            java_version,
            framework_version,
        })
    }

    fn build_system(&self) -> BuildSystem {
        BuildSystem::Maven
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPRING_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
    <modelVersion>4.0.0</modelVersion>
    <parent>
        <groupId>org.springframework.boot</groupId>
        <artifactId>spring-boot-starter-parent</artifactId>
        <version>2.5.6</version>
    </parent>
    <groupId>com.example</groupId>
    <artifactId>demo</artifactId>
    <version>0.0.1-SNAPSHOT</version>
    <properties>
        <java.version>1.8</java.version>
        <guava.version>30.1-jre</guava.version>
    </properties>
    <dependencyManagement>
        <dependencies>
            <dependency>
                <groupId>com.fasterxml.jackson</groupId>
                <artifactId>jackson-bom</artifactId>
                <version>2.12.5</version>
                <type>pom</type>
                <scope>import</scope>
            </dependency>
        </dependencies>
    </dependencyManagement>
    <dependencies>
        <dependency>
            <groupId>org.springframework.boot</groupId>
            <artifactId>spring-boot-starter-web</artifactId>
        </dependency>
        <dependency>
            <groupId>com.google.guava</groupId>
            <artifactId>guava</artifactId>
            <version>${guava.version}</version>
            <exclusions>
                <exclusion>
                    <groupId>com.google.code.findbugs</groupId>
                    <artifactId>jsr305</artifactId>
                </exclusion>
            </exclusions>
        </dependency>
        <dependency>
            <groupId>junit</groupId>
            <artifactId>junit</artifactId>
            <version>4.13.2</version>
            <scope>test</scope>
        </dependency>
        <dependency>
            <groupId>com.example</groupId>
            <artifactId>shared</artifactId>
            <version>${shared.version}</version>
        </dependency>
    </dependencies>
</project>
"#;

    #[tokio::test]
    async fn test_parses_dependencies_in_declaration_order() {
        let parsed = MavenParser::new().parse_file(SPRING_POM).await.unwrap();
        let keys: Vec<String> = parsed.dependencies.iter().map(|d| d.key()).collect();
        assert_eq!(
            keys,
            vec![
                "com.fasterxml.jackson:jackson-bom",
                "org.springframework.boot:spring-boot-starter-web",
                "com.google.guava:guava",
                "junit:junit",
                "com.example:shared",
            ]
        );
    }

    #[tokio::test]
    async fn test_resolves_properties_and_keeps_unresolved() {
        let parsed = MavenParser::new().parse_file(SPRING_POM).await.unwrap();
        let guava = &parsed.dependencies[2];
        assert_eq!(guava.version, "30.1-jre");
        assert_eq!(guava.version_property.as_deref(), Some("guava.version"));
        let shared = &parsed.dependencies[4];
        assert_eq!(shared.version, "${shared.version}");
        assert_eq!(shared.version_property.as_deref(), Some("shared.version"));
        assert_eq!(parsed.dependencies[3].version_property, None);
        let web = &parsed.dependencies[1];
        assert_eq!(web.version, "");
        assert_eq!(parsed.dependencies[3].scope.as_deref(), Some("test"));
    }

    #[tokio::test]
    async fn test_detects_java_and_framework_versions() {
        let parsed = MavenParser::new().parse_file(SPRING_POM).await.unwrap();
        assert_eq!(parsed.java_version.as_deref(), Some("8"));
        assert_eq!(parsed.framework_version.as_deref(), Some("2.5.6"));
    }

    #[tokio::test]
    async fn test_java_version_from_compiler_plugin() {
        let pom = r#"<project>
    <properties><jdk>11</jdk></properties>
    <build>
        <plugins>
            <plugin>
                <groupId>org.apache.maven.plugins</groupId>
                <artifactId>maven-compiler-plugin</artifactId>
                <configuration>
                    <release>${jdk}</release>
                </configuration>
            </plugin>
        </plugins>
    </build>
</project>"#;
        let parsed = MavenParser::new().parse_file(pom).await.unwrap();
        assert_eq!(parsed.java_version.as_deref(), Some("11"));
        assert!(parsed.framework_version.is_none());
        assert!(parsed.dependencies.is_empty());
    }

    #[tokio::test]
    async fn test_release_property_wins_over_source() {
        let pom = r#"<project><properties>
            <maven.compiler.source>1.8</maven.compiler.source>
            <maven.compiler.release>17</maven.compiler.release>
        </properties></project>"#;
        let parsed = MavenParser::new().parse_file(pom).await.unwrap();
        assert_eq!(parsed.java_version.as_deref(), Some("17"));
    }

    #[tokio::test]
    async fn test_framework_from_boot_dependency() {
        let pom = r#"<project><dependencies>
            <dependency>
                <groupId>org.springframework.boot</groupId>
                <artifactId>spring-boot-dependencies</artifactId>
                <version>3.1.4</version>
            </dependency>
        </dependencies></project>"#;
        let parsed = MavenParser::new().parse_file(pom).await.unwrap();
        assert_eq!(parsed.framework_version.as_deref(), Some("3.1.4"));
    }

    #[tokio::test]
    async fn test_malformed_xml_is_an_error() {
        let result = MavenParser::new()
            .parse_file("<project><dependencies></project>")
            .await;
        assert!(matches!(result, Err(ParseError::Xml { .. })));
    }

    #[test]
    fn test_supports_file() {
        let parser = MavenParser::new();
        assert!(parser.supports_file("pom.xml"));
        assert!(!parser.supports_file("build.gradle"));
    }
}
