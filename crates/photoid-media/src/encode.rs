//! Image decoding and encoding.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};
use photoid_models::OutputFormat;

use crate::error::{MediaError, MediaResult};

/// JPEG quality for white-background output.
pub const JPEG_QUALITY: u8 = 95;

/// An encoded output photo.
#[derive(Debug, Clone)]
pub struct EncodedPhoto {
    /// Encoded bytes.
    pub data: Vec<u8>,
    /// Encoding used.
    pub format: OutputFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Decode any supported format.
pub fn decode_image(input: &[u8]) -> MediaResult<DynamicImage> {
    let image = image::load_from_memory(input).map_err(|e| MediaError::decode(e.to_string()))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(MediaError::ZeroDimensions);
    }
    Ok(image)
}

/// Encode an RGBA buffer as PNG, keeping the alpha channel.
pub fn encode_png(image: &RgbaImage) -> MediaResult<Vec<u8>> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| MediaError::encode(e.to_string()))?;
    Ok(buffer)
}

/// Encode an opaque RGB buffer as JPEG.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> MediaResult<Vec<u8>> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| MediaError::encode(e.to_string()))?;
    Ok(buffer)
}
