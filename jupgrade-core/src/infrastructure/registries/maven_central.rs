//! Maven Central search API client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{PackageRegistryClient, RegistryError};
use crate::config::MavenCentralConfig;
use crate::domain::project::DependencyCoordinate;
use crate::domain::version::ArtifactVersion;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: SearchBody,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(rename = "numFound", default)]
    num_found: u64,
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    v: String,
}

/// Client for `search.maven.org`'s Solr endpoint
pub struct MavenCentralClient {
    client: Client,
    base_url: String,
    max_rows: u32,
}

impl MavenCentralClient {
    pub fn new(config: &MavenCentralConfig) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("jupgrade/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_rows: config.max_rows,
        })
    }

    /// Point the client at a different host (tests, mirrors)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Result<Self, RegistryError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, ..self })
    }

    fn search_query(coordinate: &DependencyCoordinate) -> String {
        format!(
            "g:\"{}\" AND a:\"{}\"",
            coordinate.group_id, coordinate.artifact_id
        )
    }
}

#[async_trait]
impl PackageRegistryClient for MavenCentralClient {
    #[instrument(skip(self), fields(dependency = %coordinate.key()))]
    async fn list_versions(
        &self,
        coordinate: &DependencyCoordinate,
    ) -> Result<Vec<ArtifactVersion>, RegistryError> {
        let url = format!("{}/solrsearch/select", self.base_url);
        let rows = self.max_rows.to_string();
        let query = Self::search_query(coordinate);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("core", "gav"),
                ("rows", rows.as_str()),
                ("wt", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(RegistryError::RateLimited);
        }
        if status.as_u16() == 404 {
            return Err(RegistryError::NotFound(coordinate.key()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Http {
                message: format!("Maven Central search failed: {}", body.trim()),
                status: Some(status.as_u16()),
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::Parse(e.to_string()))?;

        let mut versions: Vec<ArtifactVersion> = body
            .response
            .docs
            .iter()
            .map(|doc| ArtifactVersion::parse(&doc.v))
            .collect();
        versions.sort();
        versions.dedup();

        debug!(
            found = body.response.num_found,
            returned = versions.len(),
            "Fetched versions from Maven Central"
        );

        Ok(versions)
    }
}
