//! Per-request photo rendering.
//!
//! Everything here is CPU-bound and synchronous; async callers should run it
//! on the blocking pool.

use image::{DynamicImage, GrayImage, RgbaImage};
use photoid_models::{BgColor, CropSpec, FaceBox, OutputFormat};
use tracing::{debug, info};

use crate::compositor::{flatten_onto, WHITE};
use crate::crop_planner::{apply_crop, plan_crop, select_largest_face, CropPolicy};
use crate::encode::{decode_image, encode_jpeg, encode_png, EncodedPhoto, JPEG_QUALITY};
use crate::error::MediaResult;
use crate::face_detector::FaceDetector;

/// Output settings for one photo.
#[derive(Debug, Clone)]
pub struct PhotoJob {
    /// Final width in pixels
    pub output_width: u32,
    /// Final height in pixels
    pub output_height: u32,
    /// Background treatment
    pub bg_color: BgColor,
    /// Framing policy
    pub policy: CropPolicy,
}

/// Result of rendering a matted image.
#[derive(Debug, Clone)]
pub struct RenderedPhoto {
    /// Encoded output
    pub photo: EncodedPhoto,
    /// Crop that was applied
    pub crop: CropSpec,
    /// Face used for framing, if any
    pub face: Option<FaceBox>,
    /// Number of candidate faces the detector reported
    pub faces_detected: usize,
}

/// Decode a downloaded photo and re-encode it as PNG for background removal.
pub fn prepare_source(bytes: &[u8]) -> MediaResult<Vec<u8>> {
    let source = decode_image(bytes)?.to_rgba8();
    debug!("Decoded source image {}x{}", source.width(), source.height());
    encode_png(&source)
}

/// Decode the background remover's output into an RGBA buffer.
pub fn decode_matted(bytes: &[u8]) -> MediaResult<RgbaImage> {
    Ok(decode_image(bytes)?.to_rgba8())
}

/// Grayscale view for the detector. Alpha is dropped, not composited.
pub fn detector_input(matted: &RgbaImage) -> GrayImage {
    let rgb = DynamicImage::ImageRgba8(matted.clone()).to_rgb8();
    image::imageops::grayscale(&rgb)
}

/// Detect, crop, composite and encode a matted image.
pub fn render_photo(
    matted: &RgbaImage,
    detector: &dyn FaceDetector,
    job: &PhotoJob,
) -> MediaResult<RenderedPhoto> {
    let (width, height) = matted.dimensions();

    let faces = detector.detect(&detector_input(matted))?;
    let face = select_largest_face(&faces);

    let crop = plan_crop(
        width,
        height,
        face.as_ref(),
        job.output_width,
        job.output_height,
        &job.policy,
    );

    let branch = if face.is_some() { "face" } else { "fallback" };
    info!(
        detector = detector.name(),
        faces = faces.len(),
        branch,
        left = crop.left,
        top = crop.top,
        crop_width = crop.width,
        crop_height = crop.height,
        "Planned crop for {}x{} source",
        width,
        height
    );

    let cropped = apply_crop(matted, &crop);

    let format = job.bg_color.output_format();
    let data = match format {
        OutputFormat::Jpeg => encode_jpeg(&flatten_onto(&cropped, WHITE), JPEG_QUALITY)?,
        OutputFormat::Png => encode_png(&cropped)?,
    };

    Ok(RenderedPhoto {
        photo: EncodedPhoto {
            data,
            format,
            width: cropped.width(),
            height: cropped.height(),
        },
        crop,
        face,
        faces_detected: faces.len(),
    })
}
