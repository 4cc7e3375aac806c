//! Application state.

use std::sync::Arc;

use photoid_media::{FaceDetector, ImageFetcher, RustfaceDetector};
use photoid_ml_client::{BackgroundRemover, RembgClient};
use tracing::info;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub fetcher: Arc<ImageFetcher>,
    pub remover: Arc<dyn BackgroundRemover>,
    pub detector: Arc<dyn FaceDetector>,
}

impl AppState {
    /// Create new application state.
    ///
    /// Loads the face model once; it is shared read-only by every request.
    pub fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let fetcher = ImageFetcher::new(config.fetch.clone())?;
        let remover = RembgClient::new(config.bg_remover.clone())?;
        let detector = RustfaceDetector::from_file(&config.face_model_path, config.detector.clone())?;

        info!(
            bg_remover = %config.bg_remover.base_url,
            model = %config.face_model_path.display(),
            "Application state ready"
        );

        Ok(Self::from_parts(
            config,
            Arc::new(fetcher),
            Arc::new(remover),
            Arc::new(detector),
        ))
    }

    /// Assemble state from already-built components.
    pub fn from_parts(
        config: ApiConfig,
        fetcher: Arc<ImageFetcher>,
        remover: Arc<dyn BackgroundRemover>,
        detector: Arc<dyn FaceDetector>,
    ) -> Self {
        Self {
            config,
            fetcher,
            remover,
            detector,
        }
    }
}
