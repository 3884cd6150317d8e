//! CPCB station feed HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, instrument};

use super::StationFeed;
use super::error::FeedError;
use super::types::CpcbFeed;

/// Default URL of the CPCB station feed with coordinates.
pub const DEFAULT_FEED_URL: &str =
    "https://airquality.cpcb.gov.in/caaqms/iit_rss_feed_with_coordinates";

/// The endpoint rejects requests without a browser-like user agent.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

/// Configuration for the CPCB feed client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Feed URL
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Accept invalid TLS certificates (the CPCB host has had chain issues)
    pub accept_invalid_certs: bool,
}

impl FeedConfig {
    /// Create a config for the given feed URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: 20,
            accept_invalid_certs: false,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Toggle TLS certificate verification.
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_URL)
    }
}

/// Client for the CPCB station feed.
#[derive(Debug, Clone)]
pub struct CpcbClient {
    http: reqwest::Client,
    url: String,
}

impl CpcbClient {
    /// Create a new feed client.
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            url: config.url,
        })
    }

    /// Fetch and parse the whole feed.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch(&self) -> Result<CpcbFeed, FeedError> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "fetched CPCB feed");

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| FeedError::Json {
                message: e.to_string(),
            })?;

        Ok(CpcbFeed::from_value(value))
    }
}

#[async_trait]
impl StationFeed for CpcbClient {
    async fn load(&self) -> Result<CpcbFeed, FeedError> {
        self.fetch().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = FeedConfig::default();
        assert_eq!(config.url, DEFAULT_FEED_URL);
        assert_eq!(config.timeout_secs, 20);
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn config_builder() {
        let config = FeedConfig::new("http://localhost:8080/feed")
            .with_timeout(5)
            .with_accept_invalid_certs(true);

        assert_eq!(config.url, "http://localhost:8080/feed");
        assert_eq!(config.timeout_secs, 5);
        assert!(config.accept_invalid_certs);
    }

    #[test]
    fn client_creation() {
        assert!(CpcbClient::new(FeedConfig::default()).is_ok());
    }
}
