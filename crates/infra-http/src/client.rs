//! HTTP status fetcher implementation

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

use crate::error::transport_error;
use crate::types::parse_job_list;
use pivate_core::domain::StatusSnapshot;
use pivate_core::error::{AppError, Result};
use pivate_core::port::{FetchError, StatusFetcher};

/// Polls one endpoint returning a Jenkins-style job list
///
/// # Example
///
/// ```no_run
/// # use pivate_infra_http::HttpStatusFetcher;
/// # use std::time::Duration;
/// let fetcher = HttpStatusFetcher::new("http://ci.local/api/json", Duration::from_secs(5))?;
/// # Ok::<(), pivate_core::AppError>(())
/// ```
pub struct HttpStatusFetcher {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpStatusFetcher {
    /// Create a fetcher for `endpoint`
    ///
    /// `timeout` bounds every request, connect included.
    ///
    /// # Errors
    /// - `AppError::Config` if the endpoint is not an http(s) URL
    pub fn new(endpoint: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let raw = endpoint.as_ref();
        let endpoint = Url::parse(raw)
            .map_err(|e| AppError::Config(format!("invalid endpoint '{raw}': {e}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "invalid endpoint '{raw}': scheme must be http or https"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }
}

#[async_trait]
impl StatusFetcher for HttpStatusFetcher {
    async fn fetch(&self) -> std::result::Result<StatusSnapshot, FetchError> {
        let classify = |e: reqwest::Error| transport_error(e, self.timeout);

        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?;

        let body = response.bytes().await.map_err(classify)?;
        let snapshot = parse_job_list(&body)?;

        debug!(endpoint = %self.endpoint, jobs = snapshot.len(), "Fetched status document");
        Ok(snapshot)
    }
}
