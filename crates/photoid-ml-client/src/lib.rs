//! Client for the background-removal service.
//!
//! Background removal runs in a separate `rembg` HTTP server. This crate
//! wraps it behind the [`BackgroundRemover`] trait so the API can swap the
//! backend (or a test double) without touching request handling.

pub mod client;
pub mod error;

pub use client::{BackgroundRemover, RembgClient, RembgClientConfig};
pub use error::{MlError, MlResult};
