//! Background compositing.

use image::{Rgb, RgbImage, RgbaImage};

/// Opaque white.
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Paste a matted image onto an opaque `background` using its alpha channel
/// as the mask, dropping the alpha channel.
pub fn flatten_onto(image: &RgbaImage, background: Rgb<u8>) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut rgb = RgbImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        let inv_alpha = 1.0 - alpha;
        let blend = |fg: u8, bg: u8| (fg as f32 * alpha + bg as f32 * inv_alpha).round() as u8;
        rgb.put_pixel(
            x,
            y,
            Rgb([
                blend(r, background[0]),
                blend(g, background[1]),
                blend(b, background[2]),
            ]),
        );
    }

    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_transparent_pixels_become_background() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 0]));
        let flat = flatten_onto(&image, WHITE);
        assert!(flat.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_opaque_pixels_are_kept() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        let flat = flatten_onto(&image, WHITE);
        assert!(flat.pixels().all(|p| *p == Rgb([10, 20, 30])));
    }

    #[test]
    fn test_half_alpha_blends() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        let flat = flatten_onto(&image, WHITE);
        // 255 * (1 - 128/255) = 127
        assert_eq!(*flat.get_pixel(0, 0), Rgb([127, 127, 127]));
    }
}
