//! Traits for build manifest parsers

use crate::application::errors::ParseError;
use crate::domain::project::{BuildSystem, DependencyCoordinate};
use async_trait::async_trait;

/// What a manifest declares
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedManifest {
    /// Dependencies in declaration order
    pub dependencies: Vec<DependencyCoordinate>,
    /// Normalized Java feature release, if declared
    pub java_version: Option<String>,
    /// Spring Boot version, if the project uses it
    pub framework_version: Option<String>,
}

/// Trait for parsing build manifests
#[async_trait]
pub trait ManifestParser: Send + Sync {
    /// Check if this parser supports the given filename
    fn supports_file(&self, filename: &str) -> bool;

    /// Parse the manifest content
    async fn parse_file(&self, content: &str) -> Result<ParsedManifest, ParseError>;

    /// Build tool this manifest belongs to
    fn build_system(&self) -> BuildSystem;
}

/// Manifest file names in detection order
pub const MANIFEST_FILES: [&str; 3] = ["pom.xml", "build.gradle", "build.gradle.kts"];

/// Factory for picking a parser based on filename
pub struct ParserFactory {
    parsers: Vec<Box<dyn ManifestParser>>,
}

impl ParserFactory {
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(super::maven::MavenParser::new()),
                Box::new(super::gradle::GradleParser::new()),
            ],
        }
    }

    pub fn create_parser(&self, filename: &str) -> Option<&dyn ManifestParser> {
        self.parsers
            .iter()
            .find(|parser| parser.supports_file(filename))
            .map(|parser| parser.as_ref())
    }

    pub fn is_supported(&self, filename: &str) -> bool {
        self.create_parser(filename).is_some()
    }
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_routes_by_filename() {
        let factory = ParserFactory::new();
        assert_eq!(
            factory.create_parser("pom.xml").map(|p| p.build_system()),
            Some(BuildSystem::Maven)
        );
        assert_eq!(
            factory
                .create_parser("build.gradle.kts")
                .map(|p| p.build_system()),
            Some(BuildSystem::Gradle)
        );
        assert!(!factory.is_supported("package.json"));
    }
}
