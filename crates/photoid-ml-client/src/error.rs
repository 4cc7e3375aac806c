//! ML client error types.

use thiserror::Error;

pub type MlResult<T> = Result<T, MlError>;

#[derive(Debug, Error)]
pub enum MlError {
    #[error("background removal service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("background removal request failed: {0}")]
    RequestFailed(String),

    #[error("invalid response from background removal service: {0}")]
    InvalidResponse(String),

    #[error("background removal timed out after {0} seconds")]
    Timeout(u64),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MlError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MlError::ServiceUnavailable(_) | MlError::Timeout(_) | MlError::Network(_)
        )
    }
}
