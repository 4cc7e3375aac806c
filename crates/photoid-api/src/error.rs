//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use photoid_media::MediaError;
use photoid_ml_client::MlError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body is missing, malformed or out of range.
    #[error("{0}")]
    BadRequest(String),

    /// Source image could not be retrieved.
    #[error("Failed to download image: {0}")]
    Download(String),

    /// Anything that failed after the source image arrived.
    #[error("Processing failed: {0}")]
    Processing(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Download(_) => StatusCode::BAD_REQUEST,
            ApiError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Download(_) => "download",
            ApiError::Processing(_) => "processing",
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(e: MediaError) -> Self {
        if e.is_download_error() {
            ApiError::Download(e.to_string())
        } else {
            ApiError::Processing(e.to_string())
        }
    }
}

impl From<MlError> for ApiError {
    fn from(e: MlError) -> Self {
        ApiError::Processing(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Processing(format!("worker task failed: {}", e))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(kind = self.kind(), "{}", self);
        } else {
            warn!(kind = self.kind(), "{}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Download("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::processing("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_media_errors_split_by_stage() {
        let download: ApiError = MediaError::download_failed("404 Not Found").into();
        assert!(matches!(download, ApiError::Download(_)));
        assert!(download.to_string().starts_with("Failed to download image: "));

        let timeout: ApiError = MediaError::Timeout(30).into();
        assert!(matches!(timeout, ApiError::Download(_)));

        let decode: ApiError = MediaError::ZeroDimensions.into();
        assert!(matches!(decode, ApiError::Processing(_)));
        assert!(decode.to_string().starts_with("Processing failed: "));
    }

    #[test]
    fn test_background_removal_errors_are_processing() {
        let err: ApiError = MlError::ServiceUnavailable("down".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("down"));
    }
}
