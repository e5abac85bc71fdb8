//! Google Drive API Client
//!
//! Read-only access to the Drive v3 `files` endpoints using a shared API key.

use async_trait::async_trait;
use reqwest::Client;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

use super::backend::ListingBackend;
use super::errors::DriveError;
use super::query::{PageRequest, META_FIELDS};
use super::types::{FileListPage, FileMeta};

/// Public Drive v3 endpoint
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Maximum number of recent errors to track
const MAX_ERROR_HISTORY: usize = 10;

/// Delay before each retry attempt
const BACKOFF_MS: [u64; 3] = [500, 1000, 2000];

/// Health status values
pub const HEALTH_HEALTHY: u8 = 0;
pub const HEALTH_DEGRADED: u8 = 1;
pub const HEALTH_UNHEALTHY: u8 = 2;

/// A recent error entry for tracking
#[derive(Debug, Clone, serde::Serialize)]
pub struct ErrorEntry {
    pub timestamp: u64,
    pub operation: String,
    pub target: String,
    pub error: String,
}

/// Connection settings for [`DriveClient`]
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_base: String,
    pub api_key: String,
    pub request_timeout: Duration,
    /// Extra attempts for transient failures (0 disables retry)
    pub max_retries: u32,
}

/// Drive API client
#[derive(Clone)]
pub struct DriveClient {
    http_client: Client,
    api_base: String,
    api_key: String,
    max_retries: u32,
    /// Connection health (0=healthy, 1=degraded, 2=unhealthy)
    health: Arc<AtomicU8>,
    /// Recent error log
    error_log: Arc<RwLock<VecDeque<ErrorEntry>>>,
}

impl DriveClient {
    /// Create a new client; no request is issued until a listing is asked for
    pub fn new(settings: ClientSettings) -> Result<Self, DriveError> {
        let http_client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| DriveError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            api_key: settings.api_key,
            max_retries: settings.max_retries,
            health: Arc::new(AtomicU8::new(HEALTH_HEALTHY)),
            error_log: Arc::new(RwLock::new(VecDeque::with_capacity(MAX_ERROR_HISTORY))),
        })
    }

    /// The credential, or a ConfigError if none is configured
    fn require_key(&self) -> Result<&str, DriveError> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(DriveError::config(
                "Missing GOOGLE_API_KEY. Set it in the daemon environment.",
            ));
        }
        Ok(key)
    }

    /// Execute an operation with bounded retry and backoff
    async fn with_retry<F, Fut, T>(&self, operation: &str, target: &str, f: F) -> Result<T, DriveError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, DriveError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match f().await {
                Ok(result) => {
                    self.health.store(HEALTH_HEALTHY, Ordering::Relaxed);
                    return Ok(result);
                }
                Err(e) => {
                    if !e.is_retryable() || attempt >= self.max_retries {
                        match &e {
                            DriveError::Network(_) | DriveError::Timeout => {
                                self.health.store(HEALTH_UNHEALTHY, Ordering::Relaxed)
                            }
                            DriveError::Upstream { status: 429, .. } => {
                                self.health.store(HEALTH_DEGRADED, Ordering::Relaxed)
                            }
                            _ => {}
                        }
                        self.log_error(operation, target, &e.to_string());
                        return Err(e);
                    }

                    let delay = BACKOFF_MS
                        .get(attempt as usize)
                        .copied()
                        .unwrap_or(2000);
                    attempt += 1;
                    warn!(
                        operation = operation,
                        attempt = attempt,
                        max = self.max_retries,
                        delay_ms = delay,
                        error = %e,
                        "Retrying Drive request"
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    /// Log an error to the error history ring buffer
    fn log_error(&self, operation: &str, target: &str, error: &str) {
        let entry = ErrorEntry {
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            operation: operation.to_string(),
            target: target.to_string(),
            error: error.to_string(),
        };

        let mut log = self.error_log.write().unwrap_or_else(PoisonError::into_inner);
        if log.len() >= MAX_ERROR_HISTORY {
            log.pop_front();
        }
        log.push_back(entry);
    }

    /// Send one GET and decode the JSON body, mapping failures to DriveError
    async fn get_json<T>(&self, url: &str, params: &[(&str, String)]) -> Result<T, DriveError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http_client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(DriveError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::from_status(status.as_u16(), &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DriveError::Decode(e.to_string()))
    }

    async fn fetch_page(&self, key: &str, request: &PageRequest) -> Result<FileListPage, DriveError> {
        let url = format!("{}/files", self.api_base);
        let mut params = request.to_params();
        params.push(("key", key.to_string()));

        debug!(
            parent = request.query.parent(),
            page_token = ?request.page_token,
            all_drives = request.scope.all_drives(),
            "Listing Drive folder page"
        );

        self.get_json(&url, &params).await
    }

    async fn fetch_meta(&self, key: &str, file_id: &str) -> Result<FileMeta, DriveError> {
        let url = format!("{}/files/{}", self.api_base, urlencoding::encode(file_id));
        let params = [
            ("fields", META_FIELDS.to_string()),
            ("supportsAllDrives", "true".to_string()),
            ("key", key.to_string()),
        ];

        debug!(file_id = file_id, "Fetching Drive file metadata");
        self.get_json(&url, &params).await
    }
}

#[async_trait]
impl ListingBackend for DriveClient {
    async fn list_page(&self, request: &PageRequest) -> Result<FileListPage, DriveError> {
        let key = self.require_key()?;
        self.with_retry("list", request.query.parent(), || self.fetch_page(key, request))
            .await
    }

    async fn file_meta(&self, file_id: &str) -> Result<FileMeta, DriveError> {
        let key = self.require_key()?;
        if file_id.trim().is_empty() {
            return Err(DriveError::config("file id is required"));
        }
        self.with_retry("meta", file_id, || self.fetch_meta(key, file_id))
            .await
    }

    fn health_status(&self) -> &'static str {
        match self.health.load(Ordering::Relaxed) {
            HEALTH_HEALTHY => "healthy",
            HEALTH_DEGRADED => "degraded",
            _ => "unhealthy",
        }
    }

    fn recent_errors(&self) -> Vec<ErrorEntry> {
        self.error_log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}
