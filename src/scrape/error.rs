//! Error types for the scrape module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for scraping operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The request exceeded the configured timeout
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Network-level failure (DNS, connect, protocol)
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    /// The origin answered with a non-success status
    #[error("unexpected status {status} for {url}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// A CSS selector failed to parse
    #[error("selector error: {0}")]
    Selector(String),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl From<ScrapeError> for CrateError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::Request(e) => CrateError::Http(e),
            _ => CrateError::Scrape(err.to_string()),
        }
    }
}
