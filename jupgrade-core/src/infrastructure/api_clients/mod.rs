//! API clients for external vulnerability databases

pub mod nvd;

use async_trait::async_trait;

use crate::domain::project::DependencyCoordinate;
use crate::domain::vulnerability::VulnerabilityIssue;

pub use nvd::{NvdClient, NvdError};

/// Looks up known vulnerabilities for a single dependency
#[async_trait]
pub trait VulnerabilityApiClient: Send + Sync {
    async fn query_vulnerabilities(
        &self,
        coordinate: &DependencyCoordinate,
    ) -> Result<Vec<VulnerabilityIssue>, NvdError>;
}
