//! Report storage client
//!
//! HTTP client for the service that stores uploaded history reports.
//! One GET per report, no retries.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::shape::ReportDocument;
use super::{ReportError, ReportResult, ReportSource};

/// Production report storage service
pub const DEFAULT_REPORT_URL: &str = "https://cloudburst-backend.onrender.com";

/// Configuration for the report client
#[derive(Debug, Clone)]
pub struct ReportClientConfig {
    /// Base URL of the storage service (e.g., "https://cloudburst-backend.onrender.com")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ReportClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REPORT_URL.to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

impl ReportClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// REST client for the report storage service
pub struct ReportClient {
    client: Client,
    config: ReportClientConfig,
}

impl ReportClient {
    /// Create a new client with the given configuration
    pub fn new(config: ReportClientConfig) -> ReportResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(concat!("cloudburst/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ReportClientConfig {
        &self.config
    }

    /// URL of a stored report
    pub fn report_url(&self, report_id: &str) -> String {
        format!(
            "{}/api/report/{}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(report_id)
        )
    }

    /// Fetch a report and recognize its document shape
    ///
    /// An empty entry list is returned as a document, not an error; the
    /// caller decides how to present it.
    pub async fn fetch_report(&self, report_id: &str) -> ReportResult<ReportDocument> {
        let report_id = report_id.trim();
        if report_id.is_empty() {
            return Err(ReportError::InvalidId(report_id.to_string()));
        }

        let url = self.report_url(report_id);
        tracing::info!(report_id, url = %url, "Fetching report");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(report_id, status = status.as_u16(), "Report request rejected");
            return Err(status_error(report_id, status));
        }

        let body = response.bytes().await.map_err(classify_send_error)?;
        let document = ReportDocument::from_slice(&body)?;

        tracing::info!(
            report_id,
            shape = %document.shape,
            entries = document.len(),
            "Report received"
        );
        Ok(document)
    }
}

#[async_trait]
impl ReportSource for ReportClient {
    fn name(&self) -> &str {
        &self.config.base_url
    }

    async fn fetch(&self, report_id: &str) -> ReportResult<ReportDocument> {
        self.fetch_report(report_id).await
    }
}

/// Map a non-2xx status to a report error
pub fn status_error(report_id: &str, status: StatusCode) -> ReportError {
    if status == StatusCode::NOT_FOUND {
        ReportError::NotFound(report_id.to_string())
    } else {
        ReportError::Status {
            status: status.as_u16(),
        }
    }
}

fn classify_send_error(e: reqwest::Error) -> ReportError {
    if e.is_timeout() {
        ReportError::Timeout
    } else if e.is_connect() {
        ReportError::Unavailable
    } else {
        ReportError::Request(e)
    }
}
