//! Face detection.
//!
//! Detection is behind the [`FaceDetector`] trait so the service can share a
//! single immutable detector across requests (`Arc<dyn FaceDetector>`) and
//! tests can substitute a fixed one. The built-in backend is
//! [`RustfaceDetector`], a SeetaFace frontal-face cascade.

use image::GrayImage;
use photoid_models::FaceBox;
use serde::{Deserialize, Serialize};

use crate::error::MediaResult;

/// Pluggable face detection backend.
pub trait FaceDetector: Send + Sync {
    /// Detect frontal faces in a grayscale image.
    ///
    /// Boxes are returned in detector order and lie inside the image.
    fn detect(&self, gray: &GrayImage) -> MediaResult<Vec<FaceBox>>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Detector sensitivity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Smallest face side in pixels (default: 50)
    pub min_face_size: u32,
    /// Image pyramid step between scales (default: 1.1)
    pub scale_factor: f32,
    /// Minimum classifier score to keep a window (default: 2.0).
    /// Plays the role of a cascade's `minNeighbors = 5` false-positive filter.
    pub score_threshold: f64,
    /// Sliding window stride in pixels (default: 4)
    pub window_step: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_face_size: 50,
            scale_factor: 1.1,
            score_threshold: 2.0,
            window_step: 4,
        }
    }
}

impl DetectorConfig {
    /// Downscale factor applied between pyramid levels.
    pub fn pyramid_scale_factor(&self) -> f32 {
        (1.0 / self.scale_factor.max(1.01)).clamp(0.01, 0.99)
    }
}

/// Clip a raw detector rectangle to the image and drop it if it is smaller
/// than `min_size` on either side.
pub fn clip_face_box(
    x: i64,
    y: i64,
    width: i64,
    height: i64,
    image_width: u32,
    image_height: u32,
    min_size: u32,
) -> Option<FaceBox> {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + width).min(image_width as i64);
    let y1 = (y + height).min(image_height as i64);

    if x1 - x0 < min_size.max(1) as i64 || y1 - y0 < min_size.max(1) as i64 {
        return None;
    }

    Some(FaceBox::new(
        x0 as u32,
        y0 as u32,
        (x1 - x0) as u32,
        (y1 - y0) as u32,
    ))
}

#[cfg(feature = "rustface")]
pub use rustface_backend::RustfaceDetector;

#[cfg(feature = "rustface")]
mod rustface_backend {
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;

    use image::GrayImage;
    use photoid_models::FaceBox;
    use tracing::{debug, info};

    use super::{clip_face_box, DetectorConfig, FaceDetector};
    use crate::error::{MediaError, MediaResult};

    /// Face detector backed by the `rustface` crate (SeetaFace engine).
    ///
    /// The model is read once and kept immutable; every call builds a
    /// short-lived detector from it, so concurrent requests never share
    /// mutable state.
    pub struct RustfaceDetector {
        model: rustface::Model,
        config: DetectorConfig,
    }

    impl RustfaceDetector {
        /// Load a SeetaFace model file.
        pub fn from_file(path: impl AsRef<Path>, config: DetectorConfig) -> MediaResult<Self> {
            let path = path.as_ref();
            let file = File::open(path)
                .map_err(|e| MediaError::model_not_found(format!("{}: {}", path.display(), e)))?;
            let model = rustface::read_model(BufReader::new(file)).map_err(|e| {
                MediaError::detection_failed(format!(
                    "invalid face model {}: {}",
                    path.display(),
                    e
                ))
            })?;

            info!(path = %path.display(), "Loaded face detection model");
            Ok(Self { model, config })
        }
    }

    impl FaceDetector for RustfaceDetector {
        fn detect(&self, gray: &GrayImage) -> MediaResult<Vec<FaceBox>> {
            let (width, height) = gray.dimensions();
            if width < self.config.min_face_size || height < self.config.min_face_size {
                return Ok(Vec::new());
            }

            let mut detector = rustface::create_detector_with_model(self.model.clone());
            detector.set_min_face_size(self.config.min_face_size);
            detector.set_score_thresh(self.config.score_threshold);
            detector.set_pyramid_scale_factor(self.config.pyramid_scale_factor());
            detector.set_slide_window_step(self.config.window_step, self.config.window_step);

            let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));
            debug!("rustface returned {} candidate(s)", faces.len());

            Ok(faces
                .iter()
                .filter_map(|face| {
                    let bbox = face.bbox();
                    clip_face_box(
                        bbox.x() as i64,
                        bbox.y() as i64,
                        bbox.width() as i64,
                        bbox.height() as i64,
                        width,
                        height,
                        self.config.min_face_size,
                    )
                })
                .collect())
        }

        fn name(&self) -> &'static str {
            "rustface"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_missing_model_file() {
            let result = RustfaceDetector::from_file(
                "/nonexistent/seeta_fd_frontal_v1.0.bin",
                DetectorConfig::default(),
            );
            assert!(matches!(result, Err(MediaError::ModelNotFound(_))));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DetectorConfig::default();
        assert_eq!(config.min_face_size, 50);
        assert_eq!(config.score_threshold, 2.0);
        assert!((config.pyramid_scale_factor() - 1.0 / 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_clip_face_box_inside() {
        let face = clip_face_box(10, 20, 60, 70, 200, 200, 50);
        assert_eq!(face, Some(FaceBox::new(10, 20, 60, 70)));
    }

    #[test]
    fn test_clip_face_box_partially_outside() {
        let face = clip_face_box(-10, 150, 80, 80, 200, 200, 50);
        assert_eq!(face, Some(FaceBox::new(0, 150, 70, 50)));
    }

    #[test]
    fn test_clip_face_box_drops_small_remainder() {
        assert_eq!(clip_face_box(180, 10, 60, 60, 200, 200, 50), None);
        assert_eq!(clip_face_box(10, 10, 40, 40, 200, 200, 50), None);
    }
}
