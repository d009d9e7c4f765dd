//! # Product Scraping Module
//!
//! This module provides the extraction engine that turns a product page URL
//! into a normalized [`ProductRecord`]. It is the first stage of the ingestion
//! workflow, responsible for fetching raw HTML and distilling it into fields.
//!
//! ## Key Components
//!
//! - `ScrapeConfig`: Configuration for the scraper (timeout, delay, user agent)
//! - `ProductRecord`: The normalized record extracted from a page
//! - `PageFetcher`: HTTP transport with browser-like headers
//! - `scrape_product`: Fetch and extract a single URL, never failing outright
//! - `scrape_batch`: Apply the extractor across an ordered URL list
//!
//! ## Features
//!
//! - Ordered selector cascades per field with first-match-wins semantics
//! - Fallback synthesis when every cascade misses (title from the host,
//!   description from the title)
//! - Relative image URL resolution against the source page
//! - Per-URL failure isolation: a failed fetch yields a placeholder record
//!   instead of aborting the batch
//! - Fixed inter-request delay between consecutive fetches
//!
//! ## Usage
//!
//! The scraper feeds the record store and the HTTP boundary; callers decide
//! whether extracted records are returned directly or persisted.

mod batch;
mod config;
mod error;
mod extract;
mod fetch;
mod urls;

// Re-export important types and functions
pub use batch::{scrape_batch, scrape_batch_with};
pub use config::ScrapeConfig;
pub use error::ScrapeError;
pub use extract::{extract_product, scrape_product};
pub use fetch::PageFetcher;
pub use urls::{host_of, normalize_url, resolve_image_url};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized product record extracted from a single page.
///
/// Exactly one of two shapes holds: either the field cascades ran and `error`
/// is `None`, or fetching/parsing failed and `error` carries the diagnostic
/// while `title`/`description` hold generic placeholder text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Resolved absolute source URL
    pub url: String,

    /// Best-effort product title, synthesized from the host when no cascade hits
    pub title: String,

    /// Best-effort description, truncated to 200 characters plus an ellipsis marker
    pub description: String,

    /// Absolute URL of a representative image, or empty when none was found
    pub image: String,

    /// Currency-symbol-prefixed price string, or empty when none was found
    pub price: String,

    /// Diagnostic set only when fetching or parsing the page failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Ingestion timestamp, stamped by batch-upload call sites only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl ProductRecord {
    /// Whether this record is the error-shaped placeholder for a failed page.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
