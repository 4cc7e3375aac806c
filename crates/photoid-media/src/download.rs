//! Source image download.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Configuration for the image fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    /// Extra attempts after a transport failure (0 = single shot)
    pub max_retries: u32,
    /// Largest accepted body in bytes
    pub max_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 0,
            max_bytes: 20 * 1024 * 1024, // 20MB
        }
    }
}

/// Downloads source photos over HTTP.
pub struct ImageFetcher {
    http: Client,
    config: FetchConfig,
}

impl ImageFetcher {
    /// Create a new fetcher.
    pub fn new(config: FetchConfig) -> MediaResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("photoid/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MediaError::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Download `url` and return the raw body.
    pub async fn fetch(&self, url: &str) -> MediaResult<Vec<u8>> {
        self.with_retry(|| self.fetch_once(url)).await
    }

    async fn fetch_once(&self, url: &str) -> MediaResult<Vec<u8>> {
        debug!("Fetching source image from {}", url);

        let mut response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::download_failed(format!(
                "{} for url {}",
                status, url
            )));
        }

        let limit = self.config.max_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(MediaError::PayloadTooLarge { limit });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.transport_error(e))? {
            if body.len() + chunk.len() > limit {
                return Err(MediaError::PayloadTooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }

    fn transport_error(&self, error: reqwest::Error) -> MediaError {
        if error.is_timeout() {
            MediaError::Timeout(self.config.timeout.as_secs())
        } else {
            MediaError::Network(error.to_string())
        }
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> MediaResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = MediaResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Image download failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(config: FetchConfig) -> ImageFetcher {
        ImageFetcher::new(config).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 0);
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3, 4]))
            .mount(&server)
            .await;

        let body = fetcher(FetchConfig::default())
            .fetch(&format!("{}/photo.png", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_non_success_status_is_download_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = fetcher(FetchConfig {
            max_retries: 3,
            ..FetchConfig::default()
        })
        .fetch(&format!("{}/missing.jpg", server.uri()))
        .await
        .unwrap_err();

        assert!(err.is_download_error());
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 2048]))
            .mount(&server)
            .await;

        let err = fetcher(FetchConfig {
            max_bytes: 1024,
            ..FetchConfig::default()
        })
        .fetch(&server.uri())
        .await
        .unwrap_err();

        assert!(matches!(err, MediaError::PayloadTooLarge { limit: 1024 }));
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let err = fetcher(FetchConfig {
            timeout: Duration::from_millis(200),
            ..FetchConfig::default()
        })
        .fetch(&server.uri())
        .await
        .unwrap_err();

        assert!(err.is_download_error());
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_default_config_makes_a_single_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .expect(1)
            .mount(&server)
            .await;

        let err = fetcher(FetchConfig {
            timeout: Duration::from_millis(200),
            ..FetchConfig::default()
        })
        .fetch(&server.uri())
        .await
        .unwrap_err();

        assert!(matches!(err, MediaError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_retry_recovers_after_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8, 8, 9]))
            .expect(1)
            .mount(&server)
            .await;

        let body = fetcher(FetchConfig {
            timeout: Duration::from_millis(200),
            max_retries: 1,
            ..FetchConfig::default()
        })
        .fetch(&server.uri())
        .await
        .unwrap();

        assert_eq!(body, vec![7, 8, 9]);
    }

    #[tokio::test]
    async fn test_invalid_url_is_download_error() {
        let err = fetcher(FetchConfig::default())
            .fetch("not a url")
            .await
            .unwrap_err();
        assert!(err.is_download_error());
    }
}
