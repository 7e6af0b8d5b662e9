//! Dependency resolver service
//!
//! Picks the newest acceptable version of a dependency from the registry and
//! detects declarations that pin one artifact at several versions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use jupgrade_core::domain::project::DependencyCoordinate;
use jupgrade_core::domain::upgrade::Conflict;
use jupgrade_core::domain::version::ArtifactVersion;
use jupgrade_core::infrastructure::registries::{PackageRegistryClient, RegistryError};

use crate::domain::VersionConstraint;

/// Filters applied when choosing the latest version
#[derive(Debug, Clone)]
pub struct ResolutionConstraints {
    pub allow_prereleases: bool,
    pub constraint: VersionConstraint,
}

impl Default for ResolutionConstraints {
    fn default() -> Self {
        Self {
            allow_prereleases: false,
            constraint: VersionConstraint::Any,
        }
    }
}

impl ResolutionConstraints {
    pub fn allowing_prereleases(mut self, allow: bool) -> Self {
        self.allow_prereleases = allow;
        self
    }

    pub fn with_constraint(mut self, constraint: VersionConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    fn accepts(&self, version: &ArtifactVersion) -> bool {
        if !self.allow_prereleases && (version.is_prerelease() || version.is_snapshot()) {
            return false;
        }
        self.constraint.satisfies(version)
    }
}

/// Service for resolving dependency versions
#[async_trait]
pub trait DependencyResolverService: Send + Sync {
    /// Newest registry version accepted by `constraints`, or `None` if nothing qualifies
    async fn resolve_latest_version(
        &self,
        coordinate: &DependencyCoordinate,
        constraints: &ResolutionConstraints,
    ) -> Result<Option<ArtifactVersion>, RegistryError>;
}

/// Registry-backed resolver
pub struct DependencyResolver {
    registry: Arc<dyn PackageRegistryClient>,
}

impl DependencyResolver {
    pub fn new(registry: Arc<dyn PackageRegistryClient>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl DependencyResolverService for DependencyResolver {
    #[instrument(skip(self, constraints), fields(dependency = %coordinate.key()))]
    async fn resolve_latest_version(
        &self,
        coordinate: &DependencyCoordinate,
        constraints: &ResolutionConstraints,
    ) -> Result<Option<ArtifactVersion>, RegistryError> {
        let versions = self.registry.list_versions(coordinate).await?;
        let available = versions.len();

        let latest = versions.into_iter().filter(|v| constraints.accepts(v)).max();

        debug!(
            available,
            latest = latest.as_ref().map(ArtifactVersion::as_str),
            "Resolved latest version"
        );
        Ok(latest)
    }
}

/// Group declarations by `group:artifact` and report every key declared with
/// more than one distinct version string. Output follows first-seen key order.
pub fn check_conflicts(dependencies: &[DependencyCoordinate]) -> Vec<Conflict> {
    let mut order: Vec<String> = Vec::new();
    let mut versions: HashMap<String, Vec<String>> = HashMap::new();

    for dependency in dependencies {
        let key = dependency.key();
        let seen = versions.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            Vec::new()
        });
        if !seen.contains(&dependency.version) {
            seen.push(dependency.version.clone());
        }
    }

    order
        .into_iter()
        .filter_map(|key| {
            let found = versions.remove(&key)?;
            (found.len() > 1).then(|| Conflict {
                key,
                versions: found,
            })
        })
        .collect()
}
