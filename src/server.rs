//! HTTP boundary for the scraping service
//!
//! Routes mirror the public surface: ad-hoc scraping endpoints that return
//! records without persisting them, and admin endpoints that scrape, stamp,
//! and append to the record store. The store sits behind a mutex so admin
//! writes never interleave.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{error, info};

use grabbit::scrape::{scrape_batch, scrape_product, PageFetcher, ProductRecord};
use grabbit::store::RecordStore;

#[derive(Clone)]
struct AppState {
    fetcher: Arc<PageFetcher>,
    store: Arc<Mutex<RecordStore>>,
}

impl AppState {
    fn new(store: RecordStore) -> Self {
        Self {
            fetcher: Arc::new(PageFetcher::default()),
            store: Arc::new(Mutex::new(store)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScrapeRequest {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeListRequest {
    #[serde(default)]
    urls: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ProductsResponse {
    products: Vec<ProductRecord>,
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    message: String,
    products_added: usize,
    total_products: usize,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Run the API server until shutdown.
pub async fn run(bind: &str, store: RecordStore) -> Result<()> {
    let state = AppState::new(store);
    let app = router(state);

    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address {bind}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{addr}");
    axum::serve(listener, app).await.context("server shutdown")?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/scrape-product", post(scrape_one))
        .route("/api/scrape-products", post(scrape_many))
        .route("/api/health", get(health))
        .route("/api/admin/upload-products-urls", post(upload_products_urls))
        .route("/api/admin/upload-products-file", post(upload_products_file))
        .route("/api/admin/products", get(list_products))
        .route("/api/admin/clear-products", delete(clear_products))
        .route("/api/admin/admin-help", get(admin_help))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "grabbit",
    })
}

async fn scrape_one(
    State(state): State<AppState>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Json<ProductRecord>, (StatusCode, Json<ErrorBody>)> {
    let url = match request.url {
        Some(url) if !url.trim().is_empty() => url,
        _ => return Err(bad_request("URL is required")),
    };
    Ok(Json(scrape_product(&state.fetcher, &url).await))
}

async fn scrape_many(
    State(state): State<AppState>,
    Json(request): Json<ScrapeListRequest>,
) -> Result<Json<ProductsResponse>, (StatusCode, Json<ErrorBody>)> {
    let urls = match request.urls {
        Some(urls) if !urls.is_empty() => urls,
        _ => return Err(bad_request("URLs array is required")),
    };
    let products = scrape_batch(&state.fetcher, &urls).await;
    Ok(Json(ProductsResponse { products }))
}

async fn upload_products_urls(
    State(state): State<AppState>,
    Json(request): Json<ScrapeListRequest>,
) -> Result<Json<UploadResponse>, (StatusCode, Json<ErrorBody>)> {
    let urls: Vec<String> = request
        .urls
        .unwrap_or_default()
        .into_iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect();
    if urls.is_empty() {
        return Err(bad_request("No URLs provided"));
    }
    ingest(&state, urls).await
}

async fn upload_products_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, Json<ErrorBody>)> {
    let mut upload: Option<(String, String)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content = field
                .text()
                .await
                .map_err(|e| bad_request(e.to_string()))?;
            upload = Some((filename, content));
            break;
        }
    }
    let Some((filename, content)) = upload else {
        return Err(bad_request("No file provided"));
    };
    let urls = urls_from_upload(&filename, &content).map_err(bad_request)?;
    ingest(&state, urls).await
}

/// Validate an uploaded URL file and split it into non-blank lines.
fn urls_from_upload(filename: &str, content: &str) -> Result<Vec<String>, String> {
    if filename.is_empty() {
        return Err("No file selected".to_string());
    }
    if !filename.ends_with(".txt") {
        return Err("Only .txt files are allowed".to_string());
    }
    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    if urls.is_empty() {
        return Err("No URLs found in file".to_string());
    }
    Ok(urls)
}

/// Scrape `urls`, stamp the results, and append them to the store.
async fn ingest(
    state: &AppState,
    urls: Vec<String>,
) -> Result<Json<UploadResponse>, (StatusCode, Json<ErrorBody>)> {
    let mut records = scrape_batch(&state.fetcher, &urls).await;
    let now = Utc::now();
    for record in &mut records {
        record.uploaded_at = Some(now);
    }
    let added = records.len();

    let store = state.store.lock().await;
    let total = store.append(records).await.map_err(|e| {
        error!("Failed to save products: {}", e);
        internal_error("Failed to save products")
    })?;

    Ok(Json(UploadResponse {
        message: format!("Successfully uploaded {added} products"),
        products_added: added,
        total_products: total,
    }))
}

async fn list_products(State(state): State<AppState>) -> Json<ProductsResponse> {
    let store = state.store.lock().await;
    let products = store.load().await;
    Json(ProductsResponse { products })
}

async fn clear_products(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorBody>)> {
    let store = state.store.lock().await;
    store.clear().await.map_err(|e| {
        error!("Failed to clear products: {}", e);
        internal_error("Failed to clear products")
    })?;
    Ok(Json(MessageResponse {
        message: "All products cleared successfully".to_string(),
    }))
}

async fn admin_help() -> Json<Value> {
    Json(json!({
        "admin_endpoints": {
            "upload_file": {
                "method": "POST",
                "endpoint": "/api/admin/upload-products-file",
                "description": "Upload products from a .txt file",
                "usage": "curl -X POST -F \"file=@products.txt\" http://your-domain/api/admin/upload-products-file"
            },
            "upload_urls": {
                "method": "POST",
                "endpoint": "/api/admin/upload-products-urls",
                "description": "Upload products from JSON array of URLs",
                "usage": "curl -X POST -H \"Content-Type: application/json\" -d '{\"urls\":[\"https://example.com/product1\"]}' http://your-domain/api/admin/upload-products-urls"
            },
            "get_products": {
                "method": "GET",
                "endpoint": "/api/admin/products",
                "description": "Get all current products"
            },
            "clear_products": {
                "method": "DELETE",
                "endpoint": "/api/admin/clear-products",
                "description": "Clear all products"
            }
        },
        "file_format": {
            "description": "Text file should contain one URL per line",
            "example": "https://www.amazon.com/product1\nhttps://www.ebay.com/product2"
        }
    }))
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

fn internal_error(message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use tempfile::TempDir;

    fn state_with_store(dir: &TempDir) -> AppState {
        AppState::new(RecordStore::with_path(dir.path().join("products.json")))
    }

    #[tokio::test]
    async fn test_scrape_one_requires_url() {
        let dir = TempDir::new().unwrap();
        let state = state_with_store(&dir);

        let err = scrape_one(State(state.clone()), Json(ScrapeRequest { url: None }))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(err.1 .0.error, "URL is required");

        let err = scrape_one(
            State(state),
            Json(ScrapeRequest {
                url: Some("   ".to_string()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.1 .0.error, "URL is required");
    }

    #[tokio::test]
    async fn test_scrape_many_requires_urls_array() {
        let dir = TempDir::new().unwrap();
        let state = state_with_store(&dir);

        let err = scrape_many(State(state.clone()), Json(ScrapeListRequest { urls: None }))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(err.1 .0.error, "URLs array is required");

        let err = scrape_many(
            State(state),
            Json(ScrapeListRequest {
                urls: Some(Vec::new()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.1 .0.error, "URLs array is required");
    }

    #[tokio::test]
    async fn test_scrape_one_returns_record_without_persisting() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/p")
            .with_body(r#"<html><head><meta property="og:title" content="Widget"></head></html>"#)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let state = state_with_store(&dir);
        let record = scrape_one(
            State(state.clone()),
            Json(ScrapeRequest {
                url: Some(format!("{}/p", server.url())),
            }),
        )
        .await
        .unwrap();

        assert_eq!(record.0.title, "Widget");
        assert!(record.0.uploaded_at.is_none());
        assert!(state.store.lock().await.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_upload_urls_scrapes_stamps_and_persists() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/p")
            .with_body(r#"<html><head><meta property="og:title" content="Widget"></head></html>"#)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let state = state_with_store(&dir);
        let response = upload_products_urls(
            State(state.clone()),
            Json(ScrapeListRequest {
                urls: Some(vec![format!("{}/p", server.url())]),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.0.products_added, 1);
        assert_eq!(response.0.total_products, 1);
        assert_eq!(response.0.message, "Successfully uploaded 1 products");

        let stored = state.store.lock().await.load().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "Widget");
        assert!(stored[0].uploaded_at.is_some());
    }

    #[tokio::test]
    async fn test_upload_file_scrapes_and_persists_over_http() {
        let mut page_server = Server::new_async().await;
        page_server
            .mock("GET", "/p")
            .with_body(r#"<html><head><meta property="og:title" content="Widget"></head></html>"#)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let state = state_with_store(&dir);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let boundary = "grabbit-upload-test";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"products.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             {}/p\r\n\
             --{boundary}--\r\n",
            page_server.url()
        );
        let response = reqwest::Client::new()
            .post(format!("http://{addr}/api/admin/upload-products-file"))
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let payload: Value = response.json().await.unwrap();
        assert_eq!(payload["message"], "Successfully uploaded 1 products");
        assert_eq!(payload["products_added"], 1);
        assert_eq!(payload["total_products"], 1);

        let stored = state.store.lock().await.load().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "Widget");
        assert!(stored[0].uploaded_at.is_some());
    }

    #[tokio::test]
    async fn test_upload_urls_rejects_blank_lists() {
        let dir = TempDir::new().unwrap();
        let state = state_with_store(&dir);

        let err = upload_products_urls(
            State(state),
            Json(ScrapeListRequest {
                urls: Some(vec!["  ".to_string(), String::new()]),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(err.1 .0.error, "No URLs provided");
    }

    #[tokio::test]
    async fn test_clear_products_resets_store() {
        let dir = TempDir::new().unwrap();
        let state = state_with_store(&dir);
        {
            let store = state.store.lock().await;
            store
                .append(vec![ProductRecord {
                    url: "https://example.com/a".to_string(),
                    title: "A".to_string(),
                    description: String::new(),
                    image: String::new(),
                    price: String::new(),
                    error: None,
                    uploaded_at: None,
                }])
                .await
                .unwrap();
        }

        let response = clear_products(State(state.clone())).await.unwrap();
        assert_eq!(response.0.message, "All products cleared successfully");
        assert!(state.store.lock().await.load().await.is_empty());
    }

    #[test]
    fn test_upload_file_validation() {
        assert_eq!(
            urls_from_upload("", "https://example.com").unwrap_err(),
            "No file selected"
        );
        assert_eq!(
            urls_from_upload("urls.csv", "https://example.com").unwrap_err(),
            "Only .txt files are allowed"
        );
        assert_eq!(
            urls_from_upload("urls.txt", "\n  \n").unwrap_err(),
            "No URLs found in file"
        );

        let urls =
            urls_from_upload("urls.txt", "https://a.example.com\r\n\n  https://b.example.com  \n")
                .unwrap();
        assert_eq!(
            urls,
            vec![
                "https://a.example.com".to_string(),
                "https://b.example.com".to_string()
            ]
        );
    }
}
