//! Upgrade plan generation
//!
//! Picks the Java and Spring Boot targets, the OpenRewrite recipes that get
//! there, and the dependency versions to move to.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use jupgrade_core::config::UpgradeConfig;
use jupgrade_core::domain::project::{DependencyCoordinate, ProjectInfo};
use jupgrade_core::domain::upgrade::{DependencyUpdate, UpgradePlan};
use jupgrade_core::domain::version::{ArtifactVersion, java_major};
use jupgrade_deps::{DependencyResolverService, ResolutionConstraints, VersionConstraint};

/// Recipes applied to every upgrade after the Java migration
pub const MODERNIZATION_RECIPES: [&str; 2] = [
    "org.openrewrite.staticanalysis.CommonStaticAnalysis",
    "org.openrewrite.java.RemoveUnusedImports",
];

/// Spring Boot version used when the current one is outside the table
pub const FALLBACK_FRAMEWORK_TARGET: &str = "3.3.5";

const FRAMEWORK_TARGETS: &[(&str, &str)] = &[
    ("2.0", "2.7.18"),
    ("2.1", "2.7.18"),
    ("2.2", "2.7.18"),
    ("2.3", "2.7.18"),
    ("2.4", "2.7.18"),
    ("2.5", "2.7.18"),
    ("2.6", "2.7.18"),
    ("2.7", "3.0.13"),
    ("3.0", "3.1.12"),
    ("3.1", "3.2.12"),
    ("3.2", "3.3.5"),
];

/// Next long-term-support release after `current`.
///
/// Releases at or above 21 are returned unchanged.
pub fn next_lts_target(current: &str) -> String {
    match java_major(current) {
        0..=10 => "11".to_string(),
        11..=16 => "17".to_string(),
        17..=20 => "21".to_string(),
        _ => current.to_string(),
    }
}

/// Spring Boot release to move `current` to
pub fn framework_target(current: &str) -> &'static str {
    let mut parts = current.trim().split('.');
    let key = match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) => format!("{}.{}", major, minor),
        _ => return FALLBACK_FRAMEWORK_TARGET,
    };
    FRAMEWORK_TARGETS
        .iter()
        .find(|(line, _)| *line == key)
        .map(|(_, target)| *target)
        .unwrap_or(FALLBACK_FRAMEWORK_TARGET)
}

/// OpenRewrite recipe migrating to the given Java release
pub fn java_upgrade_recipe(target: &str) -> Option<&'static str> {
    match java_major(target) {
        11..=16 => Some("org.openrewrite.java.migrate.Java8toJava11"),
        17..=20 => Some("org.openrewrite.java.migrate.UpgradeToJava17"),
        21.. => Some("org.openrewrite.java.migrate.UpgradeToJava21"),
        _ => None,
    }
}

/// OpenRewrite recipe migrating Spring Boot to the given release line
pub fn framework_upgrade_recipe(target: &str) -> String {
    let version = ArtifactVersion::parse(target);
    format!(
        "org.openrewrite.java.spring.boot{}.UpgradeSpringBoot_{}_{}",
        version.major(),
        version.major(),
        version.minor()
    )
}

/// Java target honoring the configured ceiling.
///
/// Only LTS releases are targeted. When the next one is above the ceiling
/// the project stays on its current release.
fn java_target(current: &str, ceiling: &str) -> String {
    let next = next_lts_target(current);
    let ceiling_major = java_major(ceiling);
    if ceiling_major == 0 || java_major(&next) <= ceiling_major {
        next
    } else {
        if ceiling_major > java_major(current) {
            warn!(ceiling, current, "No LTS release between current and ceiling");
        }
        current.to_string()
    }
}

pub struct UpgradePlanner {
    resolver: Arc<dyn DependencyResolverService>,
    config: UpgradeConfig,
}

impl UpgradePlanner {
    pub fn new(resolver: Arc<dyn DependencyResolverService>, config: UpgradeConfig) -> Self {
        Self { resolver, config }
    }

    #[instrument(skip_all, fields(root = %project.root.display()))]
    pub async fn generate_plan(&self, project: &ProjectInfo) -> UpgradePlan {
        let target_java =
            java_target(&project.current_java_version, &self.config.target_java_version);

        let target_framework = project.framework_version.as_deref().and_then(|current| {
            let target = self
                .config
                .target_framework_version
                .clone()
                .unwrap_or_else(|| framework_target(current).to_string());
            (ArtifactVersion::parse(&target) > ArtifactVersion::parse(current)).then_some(target)
        });

        let mut builder = UpgradePlan::builder(target_java.clone())
            .enable_preview_features(self.config.enable_preview_features)
            .target_framework_version(target_framework.clone());

        if java_major(&target_java) > java_major(&project.current_java_version) {
            if let Some(recipe) = java_upgrade_recipe(&target_java) {
                builder = builder.recipe(recipe);
            }
        }
        builder = builder.recipes(MODERNIZATION_RECIPES);
        if let Some(target) = &target_framework {
            builder = builder.recipe(framework_upgrade_recipe(target));
        }
        builder = builder
            .recipes(self.config.custom_recipes.iter().cloned())
            .dependency_updates(self.dependency_updates(project).await);

        let plan = builder.build();
        info!(
            from = %project.current_java_version,
            to = %plan.target_java_version(),
            framework = plan.target_framework_version().unwrap_or("unchanged"),
            recipes = plan.recipes().len(),
            updates = plan.dependency_updates().len(),
            "Upgrade plan generated"
        );
        plan
    }

    /// Updates for every dependency with a newer acceptable version.
    ///
    /// Declarations sharing a version property move together to the lowest
    /// of their latest versions, and stay put when any of them can't be
    /// resolved.
    async fn dependency_updates(&self, project: &ProjectInfo) -> Vec<DependencyUpdate> {
        let mut resolved = Vec::new();
        for dependency in &project.dependencies {
            if !dependency.has_resolved_version() {
                debug!(dependency = %dependency.key(), "Skipping dependency without a concrete version");
                continue;
            }
            let latest = self.latest_version(dependency).await;
            resolved.push((dependency, latest));
        }

        let shared = shared_versions(&resolved);
        resolved
            .into_iter()
            .filter_map(|(dependency, latest)| {
                let target = match dependency.version_property.as_deref() {
                    Some(property) => shared.get(property).cloned().flatten(),
                    None => latest,
                }?;
                is_upgrade(dependency, &target)
                    .then(|| DependencyUpdate::new(dependency.clone(), target.as_str()))
            })
            .collect()
    }

    /// Newest registry version the declaration accepts. Declared Maven
    /// ranges bound the choice; hard pins are left alone.
    async fn latest_version(&self, dependency: &DependencyCoordinate) -> Option<ArtifactVersion> {
        let mut constraints =
            ResolutionConstraints::default().allowing_prereleases(self.config.allow_prereleases);
        if VersionConstraint::is_range(&dependency.version) {
            match VersionConstraint::parse(&dependency.version) {
                Ok(range) if range.is_pinned() => {
                    debug!(dependency = %dependency.key(), "Keeping pinned version");
                    return None;
                }
                Ok(range) => {
                    debug!(dependency = %dependency.key(), range = %range, "Resolving within declared range");
                    constraints = constraints.with_constraint(range);
                }
                Err(e) => {
                    warn!(dependency = %dependency.key(), error = %e, "Unreadable version range; skipping");
                    return None;
                }
            }
        }

        match self
            .resolver
            .resolve_latest_version(dependency, &constraints)
            .await
        {
            Ok(latest) => latest,
            Err(e) => {
                warn!(dependency = %dependency.key(), error = %e, "Version lookup failed; skipping");
                None
            }
        }
    }
}

/// One version per shared property: the lowest latest version among its
/// declarations, or `None` when any of them has no candidate
fn shared_versions<'a>(
    resolved: &[(&'a DependencyCoordinate, Option<ArtifactVersion>)],
) -> HashMap<&'a str, Option<ArtifactVersion>> {
    let mut shared: HashMap<&str, Option<ArtifactVersion>> = HashMap::new();
    for (dependency, latest) in resolved {
        let Some(property) = dependency.version_property.as_deref() else {
            continue;
        };
        let entry = shared.entry(property).or_insert_with(|| latest.clone());
        *entry = match (entry.take(), latest) {
            (Some(current), Some(latest)) => Some(current.min(latest.clone())),
            _ => {
                debug!(property, "Shared version property stays unchanged");
                None
            }
        };
    }
    shared
}

/// A range is replaced by the newest version inside it; a plain version
/// only moves forward
fn is_upgrade(dependency: &DependencyCoordinate, target: &ArtifactVersion) -> bool {
    if VersionConstraint::is_range(&dependency.version) {
        return true;
    }
    let current = ArtifactVersion::parse(&dependency.version);
    target.as_str() != dependency.version && *target >= current
}
