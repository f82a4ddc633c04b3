//! Screenshot recompression
//!
//! Raw captures are full-resolution PNGs, far larger than a caller needs. They are scaled
//! down to a maximum width and re-encoded as JPEG before being returned.

use crate::config::DeviceConfig;
use crate::error::Result;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, GenericImageView};
use serde::{Deserialize, Serialize};

pub const JPEG_MIME: &str = "image/jpeg";

/// Encoded screenshot; dimensions are post-compression, not the device's native size
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Screenshot {
    pub base64: String,
    pub width: u32,
    pub height: u32,
}

/// Turns raw screenshot bytes into a compact encoded image
pub trait ScreenshotCompressor: Send + Sync {
    fn compress(&self, raw: &[u8]) -> Result<Screenshot>;

    /// MIME type of the encoded output
    fn mime_type(&self) -> &'static str;
}

/// Downscale to a maximum width and encode as JPEG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegCompressor {
    pub max_width: u32,
    pub quality: u8,
}

impl JpegCompressor {
    pub fn new(max_width: u32, quality: u8) -> Self {
        Self {
            max_width: max_width.max(1),
            quality: quality.clamp(1, 100),
        }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(config.screenshot_max_width, config.screenshot_quality)
    }
}

impl Default for JpegCompressor {
    fn default() -> Self {
        Self::from_config(&DeviceConfig::default())
    }
}

impl ScreenshotCompressor for JpegCompressor {
    fn compress(&self, raw: &[u8]) -> Result<Screenshot> {
        let mut img = image::load_from_memory(raw)?;

        let (width, height) = img.dimensions();
        if width > self.max_width {
            let scaled_height = ((height as u64 * self.max_width as u64) / width as u64).max(1) as u32;
            img = img.resize_exact(self.max_width, scaled_height, FilterType::Triangle);
        }

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, self.quality).encode(
            rgb.as_raw(),
            width,
            height,
            ColorType::Rgb8,
        )?;

        Ok(Screenshot {
            base64: STANDARD.encode(&encoded),
            width,
            height,
        })
    }

    fn mime_type(&self) -> &'static str {
        JPEG_MIME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MobileError;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::new_rgba8(width, height);
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, image::ImageOutputFormat::Png).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_downscales_wide_captures() {
        let shot = JpegCompressor::new(100, 70).compress(&png(400, 800)).unwrap();
        assert_eq!((shot.width, shot.height), (100, 200));

        let decoded = STANDARD.decode(&shot.base64).unwrap();
        assert_eq!(&decoded[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_keeps_small_captures() {
        let shot = JpegCompressor::new(800, 70).compress(&png(40, 80)).unwrap();
        assert_eq!((shot.width, shot.height), (40, 80));
    }

    #[test]
    fn test_rejects_garbage() {
        let err = JpegCompressor::default().compress(b"not an image").unwrap_err();
        assert!(matches!(err, MobileError::Image(_)));
    }
}
