//! Shared data models for the PhotoID service.
//!
//! This crate provides Serde-serializable types for:
//! - The `/process` request body and its lenient background option
//! - Face boxes reported by detectors
//! - Crop specifications produced by the crop planner
//! - Output encodings and their HTTP metadata

pub mod geometry;
pub mod output;
pub mod request;

// Re-export common types
pub use geometry::{CropSpec, FaceBox};
pub use output::OutputFormat;
pub use request::{
    BgColor, ProcessRequest, DEFAULT_OUTPUT_HEIGHT, DEFAULT_OUTPUT_WIDTH, MAX_OUTPUT_DIMENSION,
};
