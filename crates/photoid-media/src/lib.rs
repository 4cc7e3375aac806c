//! Image processing for ID photos.
//!
//! This crate provides:
//! - HTTP download of source photos with size and time limits
//! - Pluggable face detection with a built-in SeetaFace backend
//! - Face-relative crop planning for fixed-aspect ID photos
//! - White-background compositing and JPEG/PNG encoding

pub mod compositor;
pub mod crop_planner;
pub mod download;
pub mod encode;
pub mod error;
pub mod face_detector;
pub mod pipeline;

pub use crop_planner::{apply_crop, plan_crop, select_largest_face, CropPolicy};
pub use download::{FetchConfig, ImageFetcher};
pub use encode::{decode_image, EncodedPhoto};
pub use error::{MediaError, MediaResult};
pub use face_detector::{DetectorConfig, FaceDetector};
#[cfg(feature = "rustface")]
pub use face_detector::RustfaceDetector;
pub use pipeline::{decode_matted, prepare_source, render_photo, PhotoJob, RenderedPhoto};
