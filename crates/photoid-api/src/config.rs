//! API configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use photoid_media::{CropPolicy, DetectorConfig, FetchConfig};
use photoid_ml_client::RembgClientConfig;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Whether to expose Prometheus metrics
    pub metrics_enabled: bool,
    /// Source image download settings
    pub fetch: FetchConfig,
    /// Background removal service settings
    pub bg_remover: RembgClientConfig,
    /// Path to the SeetaFace frontal face model
    pub face_model_path: PathBuf,
    /// Face detector sensitivity
    pub detector: DetectorConfig,
    /// ID photo framing
    pub crop_policy: CropPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 1024 * 1024, // 1MB of JSON is plenty
            environment: "development".to_string(),
            metrics_enabled: true,
            fetch: FetchConfig::default(),
            bg_remover: RembgClientConfig::default(),
            face_model_path: PathBuf::from("model/seeta_fd_frontal_v1.0.bin"),
            detector: DetectorConfig::default(),
            crop_policy: CropPolicy::default(),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_size: env_or("MAX_BODY_SIZE", defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
            fetch: FetchConfig {
                timeout: Duration::from_secs(env_or("FETCH_TIMEOUT_SECS", 30)),
                max_retries: env_or("FETCH_RETRIES", defaults.fetch.max_retries),
                max_bytes: env_or("MAX_DOWNLOAD_BYTES", defaults.fetch.max_bytes),
            },
            bg_remover: RembgClientConfig::from_env(),
            face_model_path: std::env::var("FACE_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.face_model_path),
            detector: defaults.detector,
            crop_policy: CropPolicy {
                face_width_ratio: env_or("FACE_WIDTH_RATIO", defaults.crop_policy.face_width_ratio),
                face_center_y: env_or("FACE_CENTER_Y", defaults.crop_policy.face_center_y),
                ..defaults.crop_policy
            },
        }
    }
}
