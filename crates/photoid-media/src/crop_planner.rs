//! Crop window computation for ID-photo framing.
//!
//! Given the matted image size, the selected face (if any) and the requested
//! output size, compute the region to extract so the face lands at a fixed
//! position in the final photo. The planner never fails: out-of-range
//! geometry is clamped to the source bounds.
//!
//! Integer steps (truncating conversions, halving) follow the framing rules
//! exactly so that a given input always maps to the same pixel rectangle.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use photoid_models::{CropSpec, FaceBox};
use serde::{Deserialize, Serialize};

/// Fraction of the output width the face should span.
pub const DEFAULT_FACE_WIDTH_RATIO: f64 = 0.65;

/// Vertical position of the face center as a fraction of the crop height.
pub const DEFAULT_FACE_CENTER_Y: f64 = 0.38;

/// Fraction of the source height the no-face crop is pushed down by.
pub const DEFAULT_FALLBACK_TOP_BIAS: f64 = 0.15;

/// Framing policy for ID photos.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropPolicy {
    /// Face width as a fraction of output width (default: 0.65)
    pub face_width_ratio: f64,
    /// Face center height as a fraction of crop height from the top (default: 0.38)
    pub face_center_y: f64,
    /// Downward bias of the no-face strip as a fraction of source height (default: 0.15)
    pub fallback_top_bias: f64,
}

impl Default for CropPolicy {
    fn default() -> Self {
        Self {
            face_width_ratio: DEFAULT_FACE_WIDTH_RATIO,
            face_center_y: DEFAULT_FACE_CENTER_Y,
            fallback_top_bias: DEFAULT_FALLBACK_TOP_BIAS,
        }
    }
}

/// Pick the face with the largest area. Ties keep the earliest box.
pub fn select_largest_face(faces: &[FaceBox]) -> Option<FaceBox> {
    faces.iter().copied().fold(None, |best, face| match best {
        Some(current) if current.area() >= face.area() => Some(current),
        _ => Some(face),
    })
}

/// Compute the crop for a `source_width` x `source_height` image.
///
/// With a face, the crop is scaled so the face spans
/// [`CropPolicy::face_width_ratio`] of the output width, centered on the face
/// horizontally with the face center at [`CropPolicy::face_center_y`] of the
/// crop height. Without one, the largest strip matching the output aspect
/// ratio is taken: centered when the source is wider than the target,
/// biased toward the top otherwise.
///
/// Known limitation: when the face-relative crop is larger than the source,
/// the rectangle is clamped to the source edges and ends up smaller than
/// planned, so the resize to the output size stretches it.
pub fn plan_crop(
    source_width: u32,
    source_height: u32,
    face: Option<&FaceBox>,
    output_width: u32,
    output_height: u32,
    policy: &CropPolicy,
) -> CropSpec {
    let source_width = source_width.max(1);
    let source_height = source_height.max(1);
    let output_width = output_width.max(1);
    let output_height = output_height.max(1);

    match face.filter(|f| f.width > 0) {
        Some(face) => face_crop(
            source_width,
            source_height,
            face,
            output_width,
            output_height,
            policy,
        ),
        None => fallback_crop(
            source_width,
            source_height,
            output_width,
            output_height,
            policy,
        ),
    }
}

fn face_crop(
    source_width: u32,
    source_height: u32,
    face: &FaceBox,
    output_width: u32,
    output_height: u32,
    policy: &CropPolicy,
) -> CropSpec {
    let scale = (output_width as f64 * policy.face_width_ratio) / face.width as f64;

    let crop_width = ((output_width as f64 / scale) as i64).max(1);
    let crop_height = ((output_height as f64 / scale) as i64).max(1);

    let left = face.center_x() - crop_width / 2;
    let top = (face.center_y() as f64 - crop_height as f64 * policy.face_center_y) as i64;

    let (w, h) = (source_width as i64, source_height as i64);

    // Clamp the origin first, then the far edges.
    let left = left.min(w - crop_width).max(0);
    let top = top.min(h - crop_height).max(0);
    let right = (left + crop_width).min(w);
    let bottom = (top + crop_height).min(h);

    CropSpec {
        left: left as u32,
        top: top as u32,
        width: (right - left) as u32,
        height: (bottom - top) as u32,
        output_width,
        output_height,
    }
}

fn fallback_crop(
    source_width: u32,
    source_height: u32,
    output_width: u32,
    output_height: u32,
    policy: &CropPolicy,
) -> CropSpec {
    let ratio = output_width as f64 / output_height as f64;
    let (w, h) = (source_width as f64, source_height as f64);

    if w / h > ratio {
        let width = ((h * ratio) as u32).clamp(1, source_width);
        CropSpec {
            left: (source_width - width) / 2,
            top: 0,
            width,
            height: source_height,
            output_width,
            output_height,
        }
    } else {
        let height = ((w / ratio) as i64).clamp(1, source_height as i64);
        let bias = (h * policy.fallback_top_bias) as i64;
        let top = (bias - (height - source_height as i64).div_euclid(4)).max(0);
        // A strip close to full height would otherwise run off the bottom.
        let top = top.min(source_height as i64 - height);

        CropSpec {
            left: 0,
            top: top as u32,
            width: source_width,
            height: height as u32,
            output_width,
            output_height,
        }
    }
}

/// Extract the planned region and resize it to the exact output size.
pub fn apply_crop(image: &RgbaImage, crop: &CropSpec) -> RgbaImage {
    let region = imageops::crop_imm(image, crop.left, crop.top, crop.width, crop.height).to_image();
    imageops::resize(
        &region,
        crop.output_width,
        crop.output_height,
        FilterType::Lanczos3,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(
        source: (u32, u32),
        face: Option<FaceBox>,
        output: (u32, u32),
    ) -> CropSpec {
        plan_crop(
            source.0,
            source.1,
            face.as_ref(),
            output.0,
            output.1,
            &CropPolicy::default(),
        )
    }

    #[test]
    fn test_square_source_without_face_takes_centered_vertical_strip() {
        let crop = plan((1000, 1000), None, (413, 531));
        assert_eq!(crop.width, 777); // 1000 * 413/531
        assert_eq!(crop.height, 1000);
        assert_eq!(crop.left, 111); // (1000 - 777) / 2
        assert_eq!(crop.top, 0);
        assert_eq!(crop.right(), 888);
        assert_eq!((crop.output_width, crop.output_height), (413, 531));
    }

    #[test]
    fn test_narrow_source_without_face_biases_strip_upward() {
        // 600x1000 has ratio 0.6 < 0.7778
        let crop = plan((600, 1000), None, (413, 531));
        let ratio = 413.0 / 531.0;
        let strip = (600.0_f64 / ratio) as u32;
        assert_eq!(crop.height, strip);
        assert_eq!(crop.height, 771);
        // top = 150 - floor((771 - 1000) / 4) = 150 + 58
        assert_eq!(crop.top, 208);
        assert_eq!(crop.left, 0);
        assert_eq!(crop.width, 600);
    }

    #[test]
    fn test_near_ratio_source_strip_is_kept_inside() {
        // Strip is almost the full height, the biased top would overflow.
        let crop = plan((412, 531), None, (413, 531));
        assert!(crop.fits_within(412, 531));
        assert_eq!(crop.height, 529);
        assert_eq!(crop.top, 2);
    }

    #[test]
    fn test_face_crop_matches_reference_framing() {
        let face = FaceBox::new(300, 150, 100, 120);
        let crop = plan((800, 600), Some(face), (413, 531));

        // scale = 413 * 0.65 / 100 = 2.6845
        assert_eq!(crop.width, 153); // trunc(413 / 2.6845)
        assert_eq!(crop.height, 197); // trunc(531 / 2.6845)
        assert_eq!(crop.left, 274); // 350 - 153 / 2
        assert_eq!(crop.top, 135); // trunc(210 - 197 * 0.38)
        assert!(crop.fits_within(800, 600));
    }

    #[test]
    fn test_face_near_top_left_is_clamped_to_origin() {
        let face = FaceBox::new(0, 0, 60, 60);
        let crop = plan((800, 600), Some(face), (413, 531));
        assert_eq!(crop.left, 0);
        assert_eq!(crop.top, 0);
        assert!(crop.fits_within(800, 600));
    }

    #[test]
    fn test_face_near_bottom_right_is_clamped_inside() {
        let face = FaceBox::new(740, 540, 60, 60);
        let crop = plan((800, 600), Some(face), (413, 531));
        assert_eq!(crop.right(), 800);
        assert_eq!(crop.bottom(), 600);
        assert!(crop.fits_within(800, 600));
    }

    #[test]
    fn test_oversized_crop_is_flush_with_source() {
        // Face fills the source, so the planned crop (307x395) is larger than it.
        let face = FaceBox::new(0, 0, 200, 200);
        let crop = plan((200, 200), Some(face), (413, 531));
        assert_eq!(crop.left, 0);
        assert_eq!(crop.top, 0);
        assert_eq!(crop.width, 200);
        assert_eq!(crop.height, 200);
        assert_eq!((crop.output_width, crop.output_height), (413, 531));
    }

    #[test]
    fn test_zero_width_face_falls_back() {
        let with_bad_face = plan((1000, 1000), Some(FaceBox::new(10, 10, 0, 40)), (413, 531));
        let without_face = plan((1000, 1000), None, (413, 531));
        assert_eq!(with_bad_face, without_face);
    }

    #[test]
    fn test_crop_stays_within_source_bounds() {
        let sources: [(u32, u32); 6] = [
            (1, 1),
            (3, 500),
            (500, 3),
            (640, 480),
            (480, 640),
            (4000, 3000),
        ];
        let outputs = [(413, 531), (1, 1), (600, 600), (1000, 200), (50, 4096)];

        for &(sw, sh) in &sources {
            for &(ow, oh) in &outputs {
                let mut faces = vec![None];
                for &(fx, fy) in &[(0, 0), (sw / 2, sh / 2), (sw.saturating_sub(1), sh.saturating_sub(1))] {
                    let fw = (sw / 5).max(1);
                    let fh = (sh / 5).max(1);
                    faces.push(Some(FaceBox::new(fx, fy, fw, fh)));
                }

                for face in faces {
                    let crop = plan((sw, sh), face, (ow, oh));
                    assert!(
                        crop.fits_within(sw, sh),
                        "crop {:?} escapes {}x{} (face {:?}, output {}x{})",
                        crop,
                        sw,
                        sh,
                        face,
                        ow,
                        oh
                    );
                    assert_eq!((crop.output_width, crop.output_height), (ow, oh));
                }
            }
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        let face = FaceBox::new(120, 80, 90, 110);
        let first = plan((640, 480), Some(face), (413, 531));
        let second = plan((640, 480), Some(face), (413, 531));
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_policy_changes_framing() {
        let face = FaceBox::new(300, 150, 100, 120);
        let tight = CropPolicy {
            face_width_ratio: 0.9,
            ..CropPolicy::default()
        };
        let default = plan((800, 600), Some(face), (413, 531));
        let custom = plan_crop(800, 600, Some(&face), 413, 531, &tight);
        assert!(custom.width < default.width);
    }

    #[test]
    fn test_select_largest_face() {
        let small = FaceBox::new(0, 0, 50, 50);
        let large = FaceBox::new(100, 100, 80, 90);
        let medium = FaceBox::new(200, 0, 60, 60);

        assert_eq!(select_largest_face(&[small, large, medium]), Some(large));
        assert_eq!(select_largest_face(&[medium, small, large]), Some(large));
        assert_eq!(select_largest_face(&[]), None);
    }

    #[test]
    fn test_select_largest_face_tie_keeps_first() {
        let first = FaceBox::new(0, 0, 60, 60);
        let second = FaceBox::new(300, 300, 60, 60);
        let same_area = FaceBox::new(500, 10, 40, 90);

        assert_eq!(select_largest_face(&[first, second]), Some(first));
        assert_eq!(select_largest_face(&[second, first]), Some(second));
        assert_eq!(select_largest_face(&[same_area, first]), Some(same_area));
    }

    #[test]
    fn test_apply_crop_produces_exact_output_size() {
        let image = RgbaImage::from_pixel(640, 480, image::Rgba([10, 20, 30, 255]));
        let face = FaceBox::new(280, 100, 80, 100);
        let crop = plan((640, 480), Some(face), (413, 531));

        let output = apply_crop(&image, &crop);
        assert_eq!(output.dimensions(), (413, 531));
    }

    #[test]
    fn test_apply_crop_after_oversized_clamp_still_hits_output_size() {
        let image = RgbaImage::from_pixel(120, 90, image::Rgba([0, 0, 0, 0]));
        let crop = plan((120, 90), Some(FaceBox::new(10, 5, 100, 80)), (413, 531));
        assert_eq!((crop.width, crop.height), (120, 90));
        let output = apply_crop(&image, &crop);
        assert_eq!(output.dimensions(), (413, 531));
    }
}
