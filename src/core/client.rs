// src/core/client.rs

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::core::error::{ScanError, ScanResult};

/// The single request/response boundary to the remote assessment service.
///
/// Implementations hold no per-scan state; both calls return the raw JSON body.
#[async_trait]
pub trait AssessmentClient: Send + Sync + 'static {
    /// Triggers a fresh analysis run for `domain`.
    async fn start_assessment(&self, domain: &str) -> ScanResult<Vec<u8>>;

    /// Fetches the latest, possibly cached, analysis state for `domain`.
    async fn poll_assessment(&self, domain: &str) -> ScanResult<Vec<u8>>;
}

/// Which flavour of `analyze` call to issue.
#[derive(Debug, Clone, Copy)]
enum AnalyzeMode {
    StartNew,
    FromCache,
}

/// `reqwest` client for an SSL Labs compatible `analyze` API.
#[derive(Debug, Clone)]
pub struct SslLabsClient {
    http: reqwest::Client,
    base_url: String,
}

impl SslLabsClient {
    /// Builds the client. `base_url` is the API root, e.g. `https://api.ssllabs.com/api/v2`.
    pub fn new(base_url: &str, request_timeout: Duration) -> ScanResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("tls-verdict/", env!("CARGO_PKG_VERSION")))
            .timeout(request_timeout)
            .build()
            .map_err(|e| {
                error!(error = %e, "Failed to build HTTP client for assessments.");
                ScanError::Transport(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn analyze(&self, domain: &str, mode: AnalyzeMode) -> ScanResult<Vec<u8>> {
        let url = format!("{}/analyze", self.base_url);
        let mut query = vec![
            ("host", domain),
            ("publish", "off"),
            ("all", "done"),
            ("ignoreMismatch", "on"),
        ];
        match mode {
            AnalyzeMode::StartNew => query.push(("startNew", "on")),
            AnalyzeMode::FromCache => query.push(("fromCache", "on")),
        }

        debug!(domain, ?mode, "Calling assessment API.");
        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "Assessment request failed.");
                ScanError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(domain, %status, "Assessment API answered with an error status.");
            return Err(ScanError::Transport(format!(
                "Assessment API returned HTTP {} for {}",
                status, domain
            )));
        }

        let body = response.bytes().await?;
        info!(domain, ?mode, bytes = body.len(), "Assessment API response received.");
        Ok(body.to_vec())
    }
}

#[async_trait]
impl AssessmentClient for SslLabsClient {
    async fn start_assessment(&self, domain: &str) -> ScanResult<Vec<u8>> {
        self.analyze(domain, AnalyzeMode::StartNew).await
    }

    async fn poll_assessment(&self, domain: &str) -> ScanResult<Vec<u8>> {
        self.analyze(domain, AnalyzeMode::FromCache).await
    }
}
