//! Output encodings.

use serde::{Deserialize, Serialize};

/// Encoded output format of a processed photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Opaque JPEG (white background).
    Jpeg,
    /// PNG with alpha (transparent background).
    Png,
}

impl OutputFormat {
    /// MIME type for the `Content-Type` header.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    /// Suggested download filename.
    pub fn download_name(&self) -> String {
        format!("photo_id.{}", self.extension())
    }
}
