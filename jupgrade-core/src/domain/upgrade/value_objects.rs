//! Value objects for upgrade planning

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::domain::project::DependencyCoordinate;

/// A single dependency version change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyUpdate {
    pub coordinate: DependencyCoordinate,
    pub from_version: String,
    pub to_version: String,
}

impl DependencyUpdate {
    pub fn new(coordinate: DependencyCoordinate, to_version: impl Into<String>) -> Self {
        Self {
            from_version: coordinate.version.clone(),
            coordinate,
            to_version: to_version.into(),
        }
    }

    pub fn key(&self) -> String {
        self.coordinate.key()
    }
}

impl fmt::Display for DependencyUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {}",
            self.coordinate.key(),
            self.from_version,
            self.to_version
        )
    }
}

/// The concrete upgrade to perform.
///
/// Only constructible through [`UpgradePlanBuilder`], which guarantees that no
/// two dependency updates share a `group:artifact` key and no recipe repeats.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradePlan {
    target_java_version: String,
    target_framework_version: Option<String>,
    recipes: Vec<String>,
    dependency_updates: Vec<DependencyUpdate>,
    enable_preview_features: bool,
}

impl UpgradePlan {
    pub fn builder(target_java_version: impl Into<String>) -> UpgradePlanBuilder {
        UpgradePlanBuilder::new(target_java_version)
    }

    pub fn target_java_version(&self) -> &str {
        &self.target_java_version
    }

    pub fn target_framework_version(&self) -> Option<&str> {
        self.target_framework_version.as_deref()
    }

    pub fn recipes(&self) -> &[String] {
        &self.recipes
    }

    pub fn dependency_updates(&self) -> &[DependencyUpdate] {
        &self.dependency_updates
    }

    pub fn enable_preview_features(&self) -> bool {
        self.enable_preview_features
    }
}

/// Builder for [`UpgradePlan`]
#[derive(Debug, Clone)]
pub struct UpgradePlanBuilder {
    target_java_version: String,
    target_framework_version: Option<String>,
    recipes: Vec<String>,
    dependency_updates: Vec<DependencyUpdate>,
    enable_preview_features: bool,
    seen_recipes: HashSet<String>,
    seen_dependencies: HashSet<String>,
}

impl UpgradePlanBuilder {
    pub fn new(target_java_version: impl Into<String>) -> Self {
        Self {
            target_java_version: target_java_version.into(),
            target_framework_version: None,
            recipes: Vec::new(),
            dependency_updates: Vec::new(),
            enable_preview_features: false,
            seen_recipes: HashSet::new(),
            seen_dependencies: HashSet::new(),
        }
    }

    pub fn target_framework_version(mut self, version: Option<String>) -> Self {
        self.target_framework_version = version;
        self
    }

    pub fn enable_preview_features(mut self, enabled: bool) -> Self {
        self.enable_preview_features = enabled;
        self
    }

    /// Append a recipe; repeated identifiers are ignored
    pub fn recipe(mut self, recipe: impl Into<String>) -> Self {
        let recipe = recipe.into();
        let trimmed = recipe.trim();
        if !trimmed.is_empty() && self.seen_recipes.insert(trimmed.to_string()) {
            self.recipes.push(trimmed.to_string());
        }
        self
    }

    pub fn recipes<I, S>(self, recipes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        recipes.into_iter().fold(self, |b, r| b.recipe(r))
    }

    /// Append a dependency update; the first update for a key wins
    pub fn dependency_update(mut self, update: DependencyUpdate) -> Self {
        if self.seen_dependencies.insert(update.key()) {
            self.dependency_updates.push(update);
        } else {
            tracing::debug!(
                dependency = %update.key(),
                "Ignoring duplicate dependency update"
            );
        }
        self
    }

    pub fn dependency_updates<I>(self, updates: I) -> Self
    where
        I: IntoIterator<Item = DependencyUpdate>,
    {
        updates
            .into_iter()
            .fold(self, |b, u| b.dependency_update(u))
    }

    pub fn build(self) -> UpgradePlan {
        UpgradePlan {
            target_java_version: self.target_java_version,
            target_framework_version: self.target_framework_version,
            recipes: self.recipes,
            dependency_updates: self.dependency_updates,
            enable_preview_features: self.enable_preview_features,
        }
    }
}

/// Several distinct versions declared for one `group:artifact`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub key: String,
    /// Distinct versions in first-seen order
    pub versions: Vec<String>,
}

/// Lifecycle of a recorded upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpgradeStatus {
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl UpgradeStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UpgradeStatus::InProgress)
    }
}

impl fmt::Display for UpgradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UpgradeStatus::InProgress => "in-progress",
            UpgradeStatus::Completed => "completed",
            UpgradeStatus::Failed => "failed",
            UpgradeStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(g: &str, a: &str, from: &str, to: &str) -> DependencyUpdate {
        DependencyUpdate::new(DependencyCoordinate::new(g, a, from), to)
    }

    #[test]
    fn test_builder_drops_duplicate_dependency_keys() {
        let plan = UpgradePlan::builder("17")
            .dependency_update(update("org.slf4j", "slf4j-api", "1.7.30", "2.0.9"))
            .dependency_update(update("org.slf4j", "slf4j-api", "1.7.30", "2.0.13"))
            .dependency_update(update("junit", "junit", "4.12", "4.13.2"))
            .build();

        assert_eq!(plan.dependency_updates().len(), 2);
        assert_eq!(plan.dependency_updates()[0].to_version, "2.0.9");
        assert_eq!(plan.dependency_updates()[1].key(), "junit:junit");
    }

    #[test]
    fn test_builder_drops_duplicate_and_blank_recipes() {
        let plan = UpgradePlan::builder("11")
            .recipe("org.openrewrite.java.RemoveUnusedImports")
            .recipes(["", "org.openrewrite.java.RemoveUnusedImports", "com.example.Custom"])
            .build();

        assert_eq!(
            plan.recipes(),
            &[
                "org.openrewrite.java.RemoveUnusedImports".to_string(),
                "com.example.Custom".to_string()
            ]
        );
    }

    #[test]
    fn test_update_records_from_version() {
        let u = update("g", "a", "1.0", "2.0");
        assert_eq!(u.from_version, "1.0");
        assert_eq!(u.to_string(), "g:a: 1.0 -> 2.0");
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        let json = serde_json::to_string(&UpgradeStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        assert!(UpgradeStatus::Cancelled.is_terminal());
    }
}
