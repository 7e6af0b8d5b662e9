/*
 Infrastructure: Package Registry Clients

 Abstractions for querying an artifact registry for the published versions of
 a dependency. The only production implementation is `MavenCentralClient`,
 which talks to the Maven Central search API.

 - Domain:      ArtifactVersion ordering lives in crate::domain::version
 - Application: the dependency resolver filters and ranks what this returns
 - Infrastructure: MavenCentralClient implements the trait below
*/

pub mod maven_central;

use async_trait::async_trait;

use crate::domain::project::DependencyCoordinate;
use crate::domain::version::ArtifactVersion;

pub use maven_central::MavenCentralClient;

/// Error type for registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// HTTP/network-level error (optional status code).
    #[error("registry HTTP error: {message}, status={status:?}")]
    Http {
        message: String,
        status: Option<u16>,
    },

    /// Registry rate-limited the request.
    #[error("registry rate limited the request")]
    RateLimited,

    /// Artifact not known to the registry.
    #[error("artifact not found: {0}")]
    NotFound(String),

    /// Response body could not be understood.
    #[error("registry parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for RegistryError {
    fn from(e: reqwest::Error) -> Self {
        RegistryError::Http {
            message: e.to_string(),
            status: e.status().map(|s| s.as_u16()),
        }
    }
}

/// Trait for querying an artifact registry for available versions.
#[async_trait]
pub trait PackageRegistryClient: Send + Sync {
    /// List every published version of `coordinate`'s `group:artifact`,
    /// sorted ascending. Pre-releases are included; callers filter.
    async fn list_versions(
        &self,
        coordinate: &DependencyCoordinate,
    ) -> Result<Vec<ArtifactVersion>, RegistryError>;
}
