//! Field extraction cascades for product pages
//!
//! Each record field is driven by an ordered list of CSS selector queries,
//! evaluated top to bottom with first-match-wins semantics: structured
//! metadata (Open Graph, Twitter cards) outranks document structure, which
//! outranks storefront class-name conventions. When every query in a cascade
//! misses, the field is synthesized where possible so a record always carries
//! a usable title and description.
//!
//! Extraction never fails past this module's boundary. A page that cannot be
//! fetched or queried produces an error-shaped placeholder record instead.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, warn};

use crate::scrape::ProductRecord;
use crate::scrape::error::ScrapeError;
use crate::scrape::fetch::PageFetcher;
use crate::scrape::urls::{host_of, normalize_url, resolve_image_url};

/// Title sources, most structured first
const TITLE_SELECTORS: &[&str] = &[
    r#"meta[property="og:title"]"#,
    r#"meta[name="twitter:title"]"#,
    "title",
    "h1",
    ".product-title",
    ".product-name",
    "#product-title",
];

/// Description sources
const DESCRIPTION_SELECTORS: &[&str] = &[
    r#"meta[property="og:description"]"#,
    r#"meta[name="twitter:description"]"#,
    r#"meta[name="description"]"#,
    ".product-description",
    ".product-details",
    ".description",
];

/// Image sources; meta tags carry the URL in `content`, img elements in `src`
const IMAGE_SELECTORS: &[&str] = &[
    r#"meta[property="og:image"]"#,
    r#"meta[name="twitter:image"]"#,
    ".product-image img",
    ".main-image img",
    r#"img[alt*="product"]"#,
    r#"img[class*="product"]"#,
];

/// Price containers; an element match alone is not enough, its text must also
/// contain a recognized price pattern
const PRICE_SELECTORS: &[&str] = &[
    ".price",
    ".product-price",
    ".current-price",
    ".sale-price",
    r#"[class*="price"]"#,
    r#"[id*="price"]"#,
];

/// Currency symbol followed by digits with optional thousands separators and
/// an optional decimal fraction, e.g. `$1,299.99`
const PRICE_PATTERN: &str = r"[$£€¥][\d,]+\.?\d*";

/// Descriptions are capped at this many characters before the marker
const DESCRIPTION_LIMIT: usize = 200;

/// Appended to descriptions that were cut at the cap
const TRUNCATION_MARKER: &str = "...";

fn price_regex() -> &'static Regex {
    static PRICE_RE: OnceLock<Regex> = OnceLock::new();
    PRICE_RE.get_or_init(|| Regex::new(PRICE_PATTERN).expect("price pattern must compile"))
}

/// Fetch a URL and extract a product record from it.
///
/// The raw URL is normalized first, so callers may pass scheme-less input.
/// Fetch and extraction failures are absorbed into an error-shaped record;
/// this function never fails, which is what lets batches degrade per URL
/// instead of aborting.
#[instrument(skip(fetcher))]
pub async fn scrape_product(fetcher: &PageFetcher, raw_url: &str) -> ProductRecord {
    let url = normalize_url(raw_url);
    match fetcher.fetch_page(&url).await {
        Ok(html) => extract_product(&html, &url),
        Err(e) => {
            warn!("Failed to fetch {}: {}", url, e);
            error_record(&url, &e.to_string())
        }
    }
}

/// Extract a product record from already-fetched HTML.
///
/// `url` must be the absolute URL the document was fetched from; it anchors
/// relative image resolution and fallback-title synthesis.
pub fn extract_product(html: &str, url: &str) -> ProductRecord {
    match extract_fields(html, url) {
        Ok(record) => record,
        Err(e) => {
            warn!("Failed to extract fields from {}: {}", url, e);
            error_record(url, &e.to_string())
        }
    }
}

fn extract_fields(html: &str, url: &str) -> Result<ProductRecord, ScrapeError> {
    let document = Html::parse_document(html);

    let mut title = first_cascade_text(&document, TITLE_SELECTORS)?.unwrap_or_default();
    let description = first_cascade_text(&document, DESCRIPTION_SELECTORS)?
        .map(|text| truncate_description(&text));
    let image = extract_image(&document, url)?;
    let price = extract_price(&document)?;

    if title.is_empty() {
        title = format!("Product from {}", host_of(url));
        debug!("No title found for {}, synthesized fallback", url);
    }
    let description = match description {
        Some(text) => text,
        None => truncate_description(&format!("Check out this product: {title}")),
    };

    Ok(ProductRecord {
        url: url.to_string(),
        title,
        description,
        image,
        price,
        error: None,
        uploaded_at: None,
    })
}

/// Placeholder record for a page that could not be fetched or parsed
fn error_record(url: &str, reason: &str) -> ProductRecord {
    ProductRecord {
        url: url.to_string(),
        title: "Product Link".to_string(),
        description: "Unable to load product details. Click to view on original site."
            .to_string(),
        image: String::new(),
        price: String::new(),
        error: Some(reason.to_string()),
        uploaded_at: None,
    }
}

fn query_first<'a>(
    document: &'a Html,
    selector: &str,
) -> Result<Option<ElementRef<'a>>, ScrapeError> {
    let parsed = Selector::parse(selector)
        .map_err(|e| ScrapeError::Selector(format!("{selector}: {e}")))?;
    Ok(document.select(&parsed).next())
}

/// Trimmed text of a candidate element: `content` attribute for meta tags,
/// rendered text for everything else.
fn candidate_text(element: ElementRef<'_>) -> String {
    if element.value().name() == "meta" {
        element
            .value()
            .attr("content")
            .unwrap_or_default()
            .trim()
            .to_string()
    } else {
        element.text().collect::<String>().trim().to_string()
    }
}

/// Walk a selector cascade and return the first non-empty candidate text.
///
/// A selector that matches an element with empty text does not stop the
/// cascade; only a non-empty candidate wins.
fn first_cascade_text(
    document: &Html,
    selectors: &[&str],
) -> Result<Option<String>, ScrapeError> {
    for selector in selectors {
        if let Some(element) = query_first(document, selector)? {
            let text = candidate_text(element);
            if !text.is_empty() {
                return Ok(Some(text));
            }
        }
    }
    Ok(None)
}

fn extract_image(document: &Html, base_url: &str) -> Result<String, ScrapeError> {
    for selector in IMAGE_SELECTORS {
        if let Some(element) = query_first(document, selector)? {
            let attr = if element.value().name() == "meta" {
                "content"
            } else {
                "src"
            };
            let raw = element.value().attr(attr).unwrap_or_default().trim();
            if !raw.is_empty() {
                return Ok(resolve_image_url(raw, base_url));
            }
        }
    }
    Ok(String::new())
}

fn extract_price(document: &Html) -> Result<String, ScrapeError> {
    for selector in PRICE_SELECTORS {
        if let Some(element) = query_first(document, selector)? {
            let text = element.text().collect::<String>();
            if let Some(found) = price_regex().find(text.trim()) {
                return Ok(found.as_str().to_string());
            }
        }
    }
    Ok(String::new())
}

fn truncate_description(text: &str) -> String {
    if text.chars().count() > DESCRIPTION_LIMIT {
        let truncated: String = text.chars().take(DESCRIPTION_LIMIT).collect();
        format!("{truncated}{TRUNCATION_MARKER}")
    } else {
        text.to_string()
    }
}
