//! Error types for the grabbit crate

use thiserror::Error;

/// Result type for grabbit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for grabbit operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Scraping error
    #[error("Scrape error: {0}")]
    Scrape(String),

    /// Record store error
    #[error("Store error: {0}")]
    Store(String),
}
