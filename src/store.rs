//! JSON-backed persistence for scraped product records
//!
//! Records live in a single JSON array file that is rewritten whole on every
//! mutation. The store assumes one logical writer at a time; concurrent
//! writers would lose updates, so callers serialize access themselves.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::scrape::ProductRecord;

/// Default location of the record file, relative to the working directory
const DEFAULT_STORE_PATH: &str = "data/products.json";

/// Error type for record store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StoreError> for crate::Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Json(e) => crate::Error::Json(e),
            other => crate::Error::Store(other.to_string()),
        }
    }
}

type Result<T> = std::result::Result<T, StoreError>;

/// File-backed store for product records
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    /// Create a store at the default path
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }

    /// Create a store backed by a specific file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records.
    ///
    /// A missing, unreadable, or corrupt file yields an empty collection so
    /// a fresh deployment starts clean and a damaged file degrades to empty
    /// instead of taking the service down.
    pub async fn load(&self) -> Vec<ProductRecord> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(records) => records,
                Err(e) => {
                    warn!(
                        "Record file {} is not valid JSON, treating as empty: {}",
                        self.path.display(),
                        e
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(
                    "Failed to read record file {}: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Replace the backing file with exactly `records`.
    pub async fn save(&self, records: &[ProductRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            // a bare filename has an empty parent component
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, json).await?;
        debug!(
            "Saved {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Append records after the existing ones and return the new total.
    pub async fn append(&self, records: Vec<ProductRecord>) -> Result<usize> {
        let mut all = self.load().await;
        all.extend(records);
        self.save(&all).await?;
        Ok(all.len())
    }

    /// Remove every record, leaving an empty array behind.
    pub async fn clear(&self) -> Result<()> {
        self.save(&[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(url: &str, title: &str) -> ProductRecord {
        ProductRecord {
            url: url.to_string(),
            title: title.to_string(),
            description: "A product".to_string(),
            image: String::new(),
            price: "$5.00".to_string(),
            error: None,
            uploaded_at: None,
        }
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::with_path(dir.path().join("products.json"));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("products.json");
        std::fs::write(&path, "definitely not json").unwrap();

        let store = RecordStore::with_path(&path);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::with_path(dir.path().join("products.json"));

        let mut stamped = record("https://example.com/a", "A");
        stamped.uploaded_at = Some(Utc::now());
        store
            .save(&[stamped, record("https://example.com/b", "B")])
            .await
            .unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].url, "https://example.com/a");
        assert_eq!(loaded[0].title, "A");
        assert!(loaded[0].uploaded_at.is_some());
        assert_eq!(loaded[1].title, "B");
        assert!(loaded[1].uploaded_at.is_none());
    }

    #[tokio::test]
    async fn test_append_accumulates_and_counts() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::with_path(dir.path().join("products.json"));

        let total = store
            .append(vec![
                record("https://example.com/a", "A"),
                record("https://example.com/b", "B"),
            ])
            .await
            .unwrap();
        assert_eq!(total, 2);

        let total = store
            .append(vec![record("https://example.com/c", "C")])
            .await
            .unwrap();
        assert_eq!(total, 3);

        let loaded = store.load().await;
        assert_eq!(loaded[0].title, "A");
        assert_eq!(loaded[2].title, "C");
    }

    #[tokio::test]
    async fn test_clear_leaves_empty_array() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::with_path(dir.path().join("products.json"));

        store
            .save(&[record("https://example.com/a", "A")])
            .await
            .unwrap();
        store.clear().await.unwrap();

        assert!(store.load().await.is_empty());
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.trim(), "[]");
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::with_path(dir.path().join("nested/deep/products.json"));

        store
            .save(&[record("https://example.com/a", "A")])
            .await
            .unwrap();
        assert_eq!(store.load().await.len(), 1);
    }
}
