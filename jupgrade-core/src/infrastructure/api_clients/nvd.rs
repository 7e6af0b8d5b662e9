//! NVD CVE API 2.0 client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

use super::VulnerabilityApiClient;
use crate::config::NvdConfig;
use crate::domain::project::DependencyCoordinate;
use crate::domain::vulnerability::{Severity, VulnerabilityIssue};

/// NVD client errors
#[derive(Debug, thiserror::Error)]
pub enum NvdError {
    #[error("NVD HTTP error: {message}, status={status:?}")]
    Http {
        message: String,
        status: Option<u16>,
    },

    #[error("NVD rate limit exceeded")]
    RateLimited,

    #[error("Failed to parse NVD response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for NvdError {
    fn from(e: reqwest::Error) -> Self {
        NvdError::Http {
            message: e.to_string(),
            status: e.status().map(|s| s.as_u16()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CveSearchResponse {
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    vulnerabilities: Vec<CveItem>,
}

#[derive(Debug, Deserialize)]
struct CveItem {
    cve: Cve,
}

#[derive(Debug, Deserialize)]
struct Cve {
    id: String,
    #[serde(default)]
    descriptions: Vec<Description>,
    #[serde(default)]
    metrics: Metrics,
    #[serde(default)]
    references: Vec<Reference>,
}

#[derive(Debug, Deserialize)]
struct Description {
    lang: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct Reference {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct Metrics {
    #[serde(rename = "cvssMetricV31", default)]
    v31: Vec<CvssMetric>,
    #[serde(rename = "cvssMetricV30", default)]
    v30: Vec<CvssMetric>,
    #[serde(rename = "cvssMetricV2", default)]
    v2: Vec<CvssMetric>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CvssMetric {
    cvss_data: CvssData,
    /// CVSS v2 reports severity beside the data block
    #[serde(default)]
    base_severity: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CvssData {
    base_score: f64,
    #[serde(default)]
    base_severity: Option<String>,
}

impl Cve {
    fn into_issue(self, dependency: String) -> VulnerabilityIssue {
        let metric = self
            .metrics
            .v31
            .first()
            .or_else(|| self.metrics.v30.first())
            .or_else(|| self.metrics.v2.first());

        let score = metric.map(|m| m.cvss_data.base_score);
        let severity = metric
            .and_then(|m| {
                m.cvss_data
                    .base_severity
                    .as_deref()
                    .or(m.base_severity.as_deref())
                    .and_then(|s| s.parse::<Severity>().ok())
            })
            .or_else(|| score.map(Severity::from_score))
            // Not yet analyzed by NVD
            .unwrap_or(Severity::Medium);

        let description = self
            .descriptions
            .iter()
            .find(|d| d.lang == "en")
            .or_else(|| self.descriptions.first())
            .map(|d| d.value.clone())
            .unwrap_or_default();

        VulnerabilityIssue {
            id: self.id,
            severity,
            score,
            description,
            dependency,
            references: self.references.into_iter().map(|r| r.url).collect(),
        }
    }
}

/// Client for `services.nvd.nist.gov`.
///
/// Requests are paced to the configured rate limit; the NVD allows 5 requests
/// per 30 seconds without an API key and 50 with one.
pub struct NvdClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    results_per_page: u32,
    request_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl NvdClient {
    pub fn new(config: &NvdConfig) -> Result<Self, NvdError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("jupgrade/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            results_per_page: config.results_per_page,
            request_interval: config.request_interval(),
            last_request: Mutex::new(None),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_interval(mut self, interval: Duration) -> Self {
        self.request_interval = interval;
        self
    }

    /// Wait until the next request is allowed
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.request_interval;
            if ready_at > Instant::now() {
                debug!(wait_ms = (ready_at - Instant::now()).as_millis() as u64, "Pacing NVD request");
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn keyword(coordinate: &DependencyCoordinate) -> String {
        if coordinate.has_resolved_version() {
            format!("{} {}", coordinate.artifact_id, coordinate.version)
        } else {
            coordinate.artifact_id.clone()
        }
    }
}

#[async_trait]
impl VulnerabilityApiClient for NvdClient {
    #[instrument(skip(self), fields(dependency = %coordinate.key()))]
    async fn query_vulnerabilities(
        &self,
        coordinate: &DependencyCoordinate,
    ) -> Result<Vec<VulnerabilityIssue>, NvdError> {
        self.pace().await;

        let url = format!("{}/rest/json/cves/2.0", self.base_url);
        let keyword = Self::keyword(coordinate);
        let per_page = self.results_per_page.to_string();

        let mut request = self.client.get(&url).query(&[
            ("keywordSearch", keyword.as_str()),
            ("resultsPerPage", per_page.as_str()),
        ]);
        if let Some(key) = &self.api_key {
            request = request.header("apiKey", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.as_u16() == 403 || status.as_u16() == 429 {
            return Err(NvdError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NvdError::Http {
                message: format!("NVD query failed: {}", body.trim()),
                status: Some(status.as_u16()),
            });
        }

        let body: CveSearchResponse = response
            .json()
            .await
            .map_err(|e| NvdError::Parse(e.to_string()))?;

        debug!(
            keyword = %keyword,
            total = body.total_results,
            "NVD query complete"
        );

        let dependency = coordinate.key();
        Ok(body
            .vulnerabilities
            .into_iter()
            .map(|item| item.cve.into_issue(dependency.clone()))
            .collect())
    }
}
