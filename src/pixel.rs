//! Pixel adapter: coerce decoded buffers to a canonical colour form.
//!
//! Every tile written to the archive is either 8-bit gray or 24-bit RGB.
//! `image`'s `DynamicImage` already separates gray from colour variants for
//! us; the one case it doesn't model directly is a colour image that is
//! visually gray (every sample has R=G=B) — an indexed source whose palette
//! is "fake gray", realized here as a one-pass scan rather than a palette
//! lookup, since `image` expands palettes to RGB at decode time and never
//! exposes the source palette. See DESIGN.md for the full rationale.

use image::{DynamicImage, GenericImageView, GrayImage, RgbImage};

/// Canonical pixel form a tile is encoded from.
#[derive(Debug, Clone)]
pub enum CanonicalImage {
    Gray(GrayImage),
    Rgb(RgbImage),
}

impl CanonicalImage {
    pub fn width(&self) -> u32 {
        match self {
            CanonicalImage::Gray(img) => img.width(),
            CanonicalImage::Rgb(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            CanonicalImage::Gray(img) => img.height(),
            CanonicalImage::Rgb(img) => img.height(),
        }
    }

    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            CanonicalImage::Gray(img) => DynamicImage::ImageLuma8(img),
            CanonicalImage::Rgb(img) => DynamicImage::ImageRgb8(img),
        }
    }
}

/// Coerce a decoded buffer into [`CanonicalImage::Gray`] or
/// [`CanonicalImage::Rgb`]. A no-op (cheap clone) when the buffer is already
/// in the target form.
pub fn normalize(image: &DynamicImage) -> CanonicalImage {
    match image {
        DynamicImage::ImageLuma8(buf) => CanonicalImage::Gray(buf.clone()),
        DynamicImage::ImageLuma16(buf) => {
            let gray = GrayImage::from_fn(buf.width(), buf.height(), |x, y| {
                let [v] = buf.get_pixel(x, y).0;
                image::Luma([(v >> 8) as u8])
            });
            CanonicalImage::Gray(gray)
        }
        other => {
            if is_fake_gray(other) {
                CanonicalImage::Gray(other.to_luma8())
            } else {
                CanonicalImage::Rgb(other.to_rgb8())
            }
        }
    }
}

/// `true` when every sample in a non-gray image has R=G=B, i.e. the image
/// carries a colour sample model but displays as gray. Scans the whole
/// image once; short-circuits on the first counterexample.
fn is_fake_gray(image: &DynamicImage) -> bool {
    let rgb = image.to_rgb8();
    rgb.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn luma8_passes_through_as_gray() {
        let img = GrayImage::from_pixel(4, 4, Luma([128]));
        let normalized = normalize(&DynamicImage::ImageLuma8(img));
        assert!(matches!(normalized, CanonicalImage::Gray(_)));
    }

    #[test]
    fn rgb_with_distinct_channels_stays_rgb() {
        let img = RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]));
        let normalized = normalize(&DynamicImage::ImageRgb8(img));
        assert!(matches!(normalized, CanonicalImage::Rgb(_)));
    }

    #[test]
    fn rgb_with_equal_channels_collapses_to_gray() {
        let img = RgbImage::from_pixel(4, 4, Rgb([77, 77, 77]));
        let normalized = normalize(&DynamicImage::ImageRgb8(img));
        assert!(matches!(normalized, CanonicalImage::Gray(_)));
    }

    #[test]
    fn one_stray_colour_pixel_keeps_it_rgb() {
        let mut img = RgbImage::from_pixel(4, 4, Rgb([50, 50, 50]));
        img.put_pixel(2, 2, Rgb([50, 60, 50]));
        let normalized = normalize(&DynamicImage::ImageRgb8(img));
        assert!(matches!(normalized, CanonicalImage::Rgb(_)));
    }

    #[test]
    fn luma16_downscales_to_8_bit() {
        use image::ImageBuffer;
        let img: image::ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(2, 2, Luma([0xABCD]));
        let normalized = normalize(&DynamicImage::ImageLuma16(img));
        match normalized {
            CanonicalImage::Gray(g) => assert_eq!(g.get_pixel(0, 0).0[0], 0xAB),
            _ => panic!("expected gray"),
        }
    }
}
