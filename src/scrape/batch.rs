//! Sequential batch scraping
//!
//! Batches run one page at a time with a politeness delay between requests.
//! Output order mirrors input order, blank entries are dropped, and a failed
//! page yields an error-shaped record without disturbing the rest of the run.

use tokio::time::sleep;
use tracing::{info, instrument};

use crate::scrape::ProductRecord;
use crate::scrape::config::ScrapeConfig;
use crate::scrape::extract::scrape_product;
use crate::scrape::fetch::PageFetcher;

/// Scrape a list of URLs sequentially with the default politeness delay.
pub async fn scrape_batch(fetcher: &PageFetcher, urls: &[String]) -> Vec<ProductRecord> {
    scrape_batch_with(fetcher, urls, &ScrapeConfig::default(), |_| {}).await
}

/// Scrape a list of URLs sequentially, invoking `on_record` after each one.
///
/// Blank entries are skipped without consuming a delay slot. The delay from
/// `config` is applied before every request except the first, so a batch of
/// one URL scrapes immediately.
#[instrument(skip_all, fields(urls = urls.len()))]
pub async fn scrape_batch_with<F>(
    fetcher: &PageFetcher,
    urls: &[String],
    config: &ScrapeConfig,
    mut on_record: F,
) -> Vec<ProductRecord>
where
    F: FnMut(&ProductRecord),
{
    info!("Starting batch scrape of {} URLs", urls.len());
    let mut records = Vec::new();
    for url in urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
        if !records.is_empty() {
            sleep(config.delay()).await;
        }
        let record = scrape_product(fetcher, url).await;
        on_record(&record);
        records.push(record);
    }
    info!("Batch scrape completed with {} records", records.len());
    records
}
