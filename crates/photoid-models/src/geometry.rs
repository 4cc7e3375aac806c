//! Pixel-space rectangles.

use serde::{Deserialize, Serialize};

/// Axis-aligned face rectangle in source pixel coordinates, as reported by a
/// face detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceBox {
    /// Left edge x-coordinate
    pub x: u32,
    /// Top edge y-coordinate
    pub y: u32,
    /// Box width
    pub width: u32,
    /// Box height
    pub height: u32,
}

impl FaceBox {
    /// Create a new face box.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box area in pixels.
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Center x-coordinate, rounded down.
    #[inline]
    pub fn center_x(&self) -> i64 {
        self.x as i64 + (self.width / 2) as i64
    }

    /// Center y-coordinate, rounded down.
    #[inline]
    pub fn center_y(&self) -> i64 {
        self.y as i64 + (self.height / 2) as i64
    }
}

/// Region to extract from the matted image and the exact size to resize it to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropSpec {
    /// Left edge of the crop in source pixels
    pub left: u32,
    /// Top edge of the crop in source pixels
    pub top: u32,
    /// Crop width in source pixels
    pub width: u32,
    /// Crop height in source pixels
    pub height: u32,
    /// Final image width
    pub output_width: u32,
    /// Final image height
    pub output_height: u32,
}

impl CropSpec {
    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    /// Whether the crop rectangle lies inside a `width` x `height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.right() <= width
            && self.bottom() <= height
    }
}
