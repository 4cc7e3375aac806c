//! Background removal HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::error::{MlError, MlResult};

/// Removes the background from an encoded photo.
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Take an encoded image and return an encoded image whose background is
    /// transparent.
    async fn remove_background(&self, image: Vec<u8>) -> MlResult<Vec<u8>>;

    /// Whether the backend is reachable.
    async fn health_check(&self) -> MlResult<bool>;
}

/// Configuration for the rembg client.
#[derive(Debug, Clone)]
pub struct RembgClientConfig {
    /// Base URL of the rembg server
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries
    pub max_retries: u32,
}

impl Default for RembgClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7000".to_string(),
            timeout: Duration::from_secs(120), // model inference on CPU is slow
            max_retries: 0,
        }
    }
}

impl RembgClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("BG_REMOVER_URL")
                .unwrap_or_else(|_| "http://localhost:7000".to_string()),
            timeout: Duration::from_secs(
                std::env::var("BG_REMOVER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            max_retries: std::env::var("BG_REMOVER_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
        }
    }
}

/// Client for a `rembg` HTTP server.
pub struct RembgClient {
    http: Client,
    config: RembgClientConfig,
}

impl RembgClient {
    /// Create a new rembg client.
    pub fn new(config: RembgClientConfig) -> MlResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MlError::Network)?;

        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn map_send_error(&self, error: reqwest::Error) -> MlError {
        if error.is_timeout() {
            MlError::Timeout(self.config.timeout.as_secs())
        } else if error.is_connect() {
            MlError::ServiceUnavailable(error.to_string())
        } else {
            MlError::Network(error)
        }
    }

    async fn remove_once(&self, image: &[u8]) -> MlResult<Vec<u8>> {
        let url = self.url("/api/remove");
        debug!("Sending {} bytes to {}", image.len(), url);

        let part = Part::bytes(image.to_vec())
            .file_name("image.png")
            .mime_str("image/png")
            .map_err(|e| MlError::RequestFailed(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE || status == StatusCode::BAD_GATEWAY {
            return Err(MlError::ServiceUnavailable(format!(
                "rembg returned {}",
                status
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MlError::RequestFailed(format!(
                "rembg returned {}: {}",
                status, body
            )));
        }

        let bytes = response.bytes().await.map_err(|e| self.map_send_error(e))?;
        if bytes.is_empty() {
            return Err(MlError::InvalidResponse("empty body".to_string()));
        }

        Ok(bytes.to_vec())
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> MlResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = MlResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Background removal failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(MlError::RequestFailed("Unknown error".to_string())))
    }
}

#[async_trait]
impl BackgroundRemover for RembgClient {
    async fn remove_background(&self, image: Vec<u8>) -> MlResult<Vec<u8>> {
        self.with_retry(|| self.remove_once(&image)).await
    }

    async fn health_check(&self) -> MlResult<bool> {
        // rembg serves its API docs here; any success means the server is up.
        let url = self.url("/api");

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => Ok(true),
            Ok(response) => {
                warn!("rembg health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("rembg health check error: {}", e);
                Ok(false)
            }
        }
    }
}
