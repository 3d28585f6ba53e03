//! JPEG tile encoder.
//!
//! Wraps `image`'s JPEG encoder behind a single reused configuration: every
//! tile is encoded at the same fixed quality, matching the archive
//! packager's "encoder is reset between tiles but the instance is reused"
//! contract. `image`'s stable JPEG encoder has no progressive-mode flag, so
//! this produces baseline JPEG; see DESIGN.md for that deviation.

use image::codecs::jpeg::JpegEncoder;

use crate::error::TilerError;
use crate::pixel::CanonicalImage;

/// Tile quality used throughout the pyramid, expressed on `image`'s 1-100
/// scale (quality 0.75 on a 0-1 scale).
pub const DEFAULT_QUALITY_PERCENT: u8 = 75;

/// Encodes canonical pixel buffers to JPEG bytes at a fixed quality.
#[derive(Debug, Clone)]
pub struct JpegTileEncoder {
    quality: u8,
}

impl JpegTileEncoder {
    /// `quality` is on `image`'s 1-100 scale (75 ≈ the archive contract's
    /// 0.75).
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    /// Encode one tile. `(z, y, x)` are used only for error context: a
    /// failure here aborts the whole pyramid per the packager's
    /// fail-the-invocation policy.
    pub fn encode(
        &self,
        image: &CanonicalImage,
        z: u32,
        y: u32,
        x: u32,
    ) -> Result<Vec<u8>, TilerError> {
        let mut output = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut output, self.quality);

        let result = match image {
            CanonicalImage::Gray(buf) => encoder.encode_image(buf),
            CanonicalImage::Rgb(buf) => encoder.encode_image(buf),
        };

        result.map_err(|source| TilerError::Encode { z, y, x, source })?;
        Ok(output)
    }
}

impl Default for JpegTileEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY_PERCENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn encodes_gray_tile_as_valid_jpeg() {
        let encoder = JpegTileEncoder::default();
        let img = GrayImage::from_pixel(16, 16, Luma([128]));
        let bytes = encoder
            .encode(&CanonicalImage::Gray(img), 0, 0, 0)
            .unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn encodes_rgb_tile_as_valid_jpeg() {
        let encoder = JpegTileEncoder::default();
        let img = RgbImage::from_pixel(16, 16, Rgb([10, 20, 30]));
        let bytes = encoder.encode(&CanonicalImage::Rgb(img), 1, 2, 3).unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn quality_is_clamped_into_range() {
        let encoder = JpegTileEncoder::new(255);
        let img = GrayImage::from_pixel(4, 4, Luma([1]));
        assert!(encoder.encode(&CanonicalImage::Gray(img), 0, 0, 0).is_ok());
    }

    #[test]
    fn boundary_size_tile_encodes() {
        let encoder = JpegTileEncoder::default();
        let img = RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]));
        assert!(encoder.encode(&CanonicalImage::Rgb(img), 0, 0, 0).is_ok());
    }
}
