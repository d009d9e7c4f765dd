//! HTTP transport for the scraper
//!
//! This module provides the page fetcher used to retrieve raw HTML. It wraps
//! a single `reqwest` client configured with a browser-like header set and a
//! fixed per-request timeout, and maps transport failures into the scrape
//! error taxonomy so the extractor can distinguish timeouts, network errors,
//! and non-success statuses.

use crate::scrape::config::ScrapeConfig;
use crate::scrape::error::ScrapeError;
use reqwest::Client as ReqwestClient;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, instrument};

/// HTTP client for fetching product pages
#[derive(Debug, Clone)]
pub struct PageFetcher {
    /// The underlying reqwest client
    client: ReqwestClient,
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new(&ScrapeConfig::default())
    }
}

impl PageFetcher {
    /// Create a new fetcher from the given configuration
    pub fn new(config: &ScrapeConfig) -> Self {
        let client = ReqwestClient::builder()
            .user_agent(&config.user_agent)
            .default_headers(browser_headers())
            .timeout(config.request_timeout())
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Fetch a page and return its decoded body.
    ///
    /// Timeouts, network failures, and non-2xx statuses surface as distinct
    /// `ScrapeError` variants.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError> {
        debug!("Fetching {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Err(ScrapeError::Timeout(url.to_string())),
            Err(e) => return Err(ScrapeError::Request(e)),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                ScrapeError::Timeout(url.to_string())
            } else {
                ScrapeError::Request(e)
            }
        })
    }
}

/// Header set mimicking a desktop browser, minus the user agent which is
/// configured on the client itself. Accept-Encoding is negotiated by reqwest's
/// gzip/deflate support.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers
}
