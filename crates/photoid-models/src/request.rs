//! `/process` request body.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::Validate;

use crate::output::OutputFormat;

/// Default output width: 35mm at 300 DPI.
pub const DEFAULT_OUTPUT_WIDTH: u32 = 413;

/// Default output height: 45mm at 300 DPI.
pub const DEFAULT_OUTPUT_HEIGHT: u32 = 531;

/// Largest accepted output side in pixels.
pub const MAX_OUTPUT_DIMENSION: u32 = 4096;

/// Background applied behind the matted subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BgColor {
    /// Flatten onto opaque white and encode as JPEG.
    #[default]
    White,
    /// Keep the alpha channel and encode as PNG.
    Transparent,
}

impl BgColor {
    /// Encoding used for this background.
    pub fn output_format(&self) -> OutputFormat {
        match self {
            BgColor::White => OutputFormat::Jpeg,
            BgColor::Transparent => OutputFormat::Png,
        }
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BgColor::White => "white",
            BgColor::Transparent => "transparent",
        }
    }
}

impl std::fmt::Display for BgColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BgColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Only the exact string `"white"` selects a white background. Every other
/// value, including other casings, typos, numbers and `null`, is transparent.
impl<'de> Deserialize<'de> for BgColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value.as_str() {
            Some("white") => BgColor::White,
            _ => BgColor::Transparent,
        })
    }
}

/// Body of `POST /process`.
///
/// `image_url` is optional at the type level so a missing field can be
/// reported with a specific message instead of a generic decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProcessRequest {
    /// URL of the portrait to process.
    #[serde(default)]
    pub image_url: Option<String>,

    /// Output width in pixels (default 413).
    #[serde(default)]
    #[validate(range(min = 1, max = 4096))]
    pub width: Option<u32>,

    /// Output height in pixels (default 531).
    #[serde(default)]
    #[validate(range(min = 1, max = 4096))]
    pub height: Option<u32>,

    /// Background treatment (default white).
    #[serde(default)]
    pub bg_color: BgColor,
}

impl ProcessRequest {
    /// Create a request for the given URL with all defaults.
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: Some(image_url.into()),
            ..Default::default()
        }
    }

    /// Requested output size with defaults applied.
    pub fn output_size(&self) -> (u32, u32) {
        (
            self.width.unwrap_or(DEFAULT_OUTPUT_WIDTH),
            self.height.unwrap_or(DEFAULT_OUTPUT_HEIGHT),
        )
    }
}
