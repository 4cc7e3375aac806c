//! Axum HTTP API server for ID photos.
//!
//! This crate provides:
//! - `POST /process`: URL in, framed passport-style photo out
//! - Liveness and readiness probes
//! - Request ids, security headers and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
