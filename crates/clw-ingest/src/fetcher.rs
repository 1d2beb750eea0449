// Page fetcher: rendered wiki HTML over HTTP

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Error types for document retrieval
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("page not found: {0}")]
    PageNotFound(String),

    #[error("unexpected status {status} fetching page '{page}'")]
    Status { page: String, status: u16 },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Configuration for the HTTP fetcher
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Base URL of the rendered-HTML endpoint; the encoded page id is
    /// appended as the final path segment
    pub api_base: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum retries for transient network failures
    pub max_retries: u32,

    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            api_base: "https://en.wikipedia.org/api/rest_v1/page/html".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            user_agent: "clw-ingest/0.1".to_string(),
        }
    }
}

/// HTTP client for fetching rendered wiki pages
pub struct PageFetcher {
    client: Client,
    config: FetchConfig,
}

impl PageFetcher {
    /// Create a new fetcher with a bounded request timeout
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(PageFetcher { client, config })
    }

    /// Rendered-HTML URL for a page id (spaces normalize to underscores)
    pub fn page_url(&self, page: &str) -> String {
        let canonical = page.replace(' ', "_");
        format!("{}/{}", self.config.api_base, urlencoding::encode(&canonical))
    }

    /// Fetch a page's rendered HTML.
    ///
    /// Transient network failures (including timeout expiry) retry with
    /// exponential backoff up to the configured limit; a missing page or an
    /// unexpected status fails immediately.
    pub async fn fetch(&self, page: &str) -> Result<String, FetchError> {
        let url = self.page_url(page);

        let mut last_error: Option<FetchError> = None;
        for attempt in 0..=self.config.max_retries {
            match self.fetch_once(page, &url).await {
                Ok(html) => {
                    info!(page, bytes = html.len(), "Fetched page");
                    return Ok(html);
                },
                Err(e @ FetchError::Network(_)) => {
                    warn!(page, attempt, error = %e, "Fetch attempt failed");
                    last_error = Some(e);

                    if attempt < self.config.max_retries {
                        let backoff_secs = 2u64.pow(attempt);
                        info!("Retrying in {} seconds...", backoff_secs);
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                    }
                },
                Err(e) => return Err(e),
            }
        }

        // Guaranteed set: the loop only falls through after a network error
        Err(last_error.unwrap_or(FetchError::PageNotFound(page.to_string())))
    }

    async fn fetch_once(&self, page: &str, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(FetchError::PageNotFound(page.to_string())),
            status if !status.is_success() => Err(FetchError::Status {
                page: page.to_string(),
                status: status.as_u16(),
            }),
            _ => Ok(response.text().await?),
        }
    }
}
