//! # Grabbit - Product Page Scraper
//!
//! This crate turns product page URLs into structured records by fetching
//! the page with a browser-like HTTP client and walking ordered CSS selector
//! cascades over the document. Structured metadata (Open Graph, Twitter
//! cards) is preferred, with storefront markup conventions as fallbacks, so
//! a usable record comes back even from pages with sparse markup.
//!
//! ## Features
//!
//! - Browser-like page fetching with configurable timeout and user agent
//! - Selector-cascade extraction of title, description, image, and price
//! - Fallback synthesis so every record has a title and description
//! - Error-shaped placeholder records for pages that cannot be loaded
//! - Sequential batch scraping with a politeness delay
//! - JSON file persistence for scraped records
//! - Async API with Tokio
//!
//! ## Example
//!
//! ```rust,no_run
//! use grabbit::scrape::{scrape_product, PageFetcher};
//! use grabbit::store::RecordStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = PageFetcher::default();
//!     let record = scrape_product(&fetcher, "shop.example.com/product/42").await;
//!     println!("{} {}", record.title, record.price);
//!
//!     let store = RecordStore::default();
//!     store.append(vec![record]).await?;
//!     Ok(())
//! }
//! ```

mod error;

pub mod scrape;
pub mod store;

pub use error::Error;

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
