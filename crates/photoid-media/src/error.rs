//! Error types for media operations.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while fetching or processing a photo.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0}")]
    Network(String),

    #[error("{message}")]
    DownloadFailed { message: String },

    #[error("download timed out after {0} seconds")]
    Timeout(u64),

    #[error("download exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("image dimensions are zero")]
    ZeroDimensions,

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("face detection failed: {0}")]
    DetectionFailed(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create an encode error.
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode(message.into())
    }

    /// Create a detection failure error.
    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::DetectionFailed(message.into())
    }

    /// Create a model not found error.
    pub fn model_not_found(path: impl Into<String>) -> Self {
        Self::ModelNotFound(path.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the error happened while fetching the source image.
    pub fn is_download_error(&self) -> bool {
        matches!(
            self,
            MediaError::Network(_)
                | MediaError::DownloadFailed { .. }
                | MediaError::Timeout(_)
                | MediaError::PayloadTooLarge { .. }
        )
    }

    /// Whether a fetch may succeed if attempted again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MediaError::Network(_) | MediaError::Timeout(_))
    }
}
