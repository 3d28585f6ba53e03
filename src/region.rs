//! Region reader: decode a logical rectangle through a decoder, applying
//! orientation.
//!
//! Bridges the [`crate::decode::ImageDecoder`] collaborator (which only
//! knows physical coordinates) and the rest of the pyramid builder (which
//! only knows logical coordinates). Never holds more than one region's
//! pixels in memory at a time.

use image::{imageops, DynamicImage, GenericImageView, Rgb, RgbImage};

use crate::decode::ImageDecoder;
use crate::error::TilerError;
use crate::geometry::Rect;
use crate::orientation::{physical_to_logical, to_physical, Orientation};

/// Decode the logical rectangle `rect` from `decoder`, returning a buffer
/// sized exactly to `rect` and oriented in logical coordinates.
///
/// 1. Maps `rect` to the decoder's physical coordinate space via
///    [`to_physical`].
/// 2. Decodes that physical rectangle.
/// 3. Normalizes the decoded buffer's colour form (see [`crate::pixel`]).
/// 4. If the orientation requires resampling, applies the affine transform
///    from [`physical_to_logical`] with bilinear sampling into a fresh
///    buffer of `rect`'s dimensions; otherwise returns the normalized buffer
///    unchanged.
pub fn read_region(
    decoder: &mut dyn ImageDecoder,
    logical_width: u32,
    logical_height: u32,
    rect: Rect,
    orientation: Orientation,
) -> Result<DynamicImage, TilerError> {
    let physical_rect = to_physical(logical_width, logical_height, rect, orientation);
    if physical_rect.is_empty() {
        return Ok(DynamicImage::new_rgb8(0, 0));
    }

    let decoded = decoder.decode_region(physical_rect)?;

    match physical_to_logical(orientation, physical_rect.width, physical_rect.height) {
        None => Ok(decoded),
        Some(transform) => {
            // `transform` maps physical -> logical; sampling an output pixel
            // needs the other direction, logical -> physical.
            let inverse = transform
                .invert()
                .expect("orientation transforms are always invertible");
            let rgb = decoded.to_rgb8();
            let out = RgbImage::from_fn(rect.width, rect.height, |x, y| {
                let (sx, sy) = inverse.apply(x as f64, y as f64);
                sample_bilinear(&rgb, sx, sy)
            });
            Ok(DynamicImage::ImageRgb8(out))
        }
    }
}

/// Bilinear sample of `img` at fractional coordinates `(x, y)`, clamping to
/// the image's own bounds at the edges.
fn sample_bilinear(img: &RgbImage, x: f64, y: f64) -> Rgb<u8> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Rgb([0, 0, 0]);
    }

    let x = x.clamp(0.0, (w - 1) as f64);
    let y = y.clamp(0.0, (h - 1) as f64);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);

    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = img.get_pixel(x0, y0).0;
    let p10 = img.get_pixel(x1, y0).0;
    let p01 = img.get_pixel(x0, y1).0;
    let p11 = img.get_pixel(x1, y1).0;

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

/// Crop a sub-rectangle out of an already-decoded buffer (no re-decode).
/// Used by the in-memory pyramid strategy to slice tiles from a fully
/// materialized level image.
pub fn crop(image: &DynamicImage, rect: Rect) -> DynamicImage {
    if rect.is_empty() {
        return DynamicImage::new_rgb8(0, 0);
    }
    imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height)
        .to_image()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::ImageCrateDecoder;
    use std::io::Cursor;

    fn encode_png(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(w, h, |x, y| Rgb([x as u8, y as u8, 0]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn identity_orientation_returns_exact_crop() {
        let bytes = encode_png(20, 20);
        let mut decoder =
            ImageCrateDecoder::open(Cursor::new(bytes), "t.png", Orientation::Normal).unwrap();

        let region = read_region(&mut decoder, 20, 20, Rect::new(2, 3, 5, 5), Orientation::Normal)
            .unwrap();
        assert_eq!(region.dimensions(), (5, 5));
    }

    #[test]
    fn rotated_orientation_produces_rect_sized_buffer() {
        // Physical image is 20 wide x 10 tall; orientation 6 swaps to
        // logical 10 wide x 20 tall.
        let bytes = encode_png(20, 10);
        let mut decoder =
            ImageCrateDecoder::open(Cursor::new(bytes), "t.png", Orientation::Rotate90).unwrap();

        let region =
            read_region(&mut decoder, 10, 20, Rect::new(0, 0, 10, 20), Orientation::Rotate90)
                .unwrap();
        assert_eq!(region.dimensions(), (10, 20));
    }

    #[test]
    fn rotate90_samples_through_the_inverse_transform() {
        // Physical 20x10 with a marker block in the physical top-left
        // corner (x<5, y<5). Orientation 6 (Rotate90) swaps to logical
        // 10x20: a physical column maps wholesale to one logical row
        // (column 0 -> logical row 0, i.e. the top), and a physical row
        // maps wholesale to one logical column (row 0 -> logical column
        // `h`, i.e. the right edge) — so the physical top-left block should
        // land near the logical top-right corner, not top-left.
        let marker = Rgb([220u8, 20, 20]);
        let background = Rgb([30u8, 30, 30]);
        let img = RgbImage::from_fn(20, 10, |x, y| {
            if x < 5 && y < 5 {
                marker
            } else {
                background
            }
        });
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();

        let mut decoder =
            ImageCrateDecoder::open(Cursor::new(buf), "t.png", Orientation::Rotate90).unwrap();
        let region =
            read_region(&mut decoder, 10, 20, Rect::new(0, 0, 10, 20), Orientation::Rotate90)
                .unwrap()
                .to_rgb8();

        let near_top_right = region.get_pixel(9, 2);
        let near_bottom_left = region.get_pixel(1, 17);

        assert!(
            near_top_right[0] as i32 - near_top_right[2] as i32 > 100,
            "expected the marker near the logical top-right corner, got {near_top_right:?}"
        );
        assert!(
            (near_bottom_left[0] as i32 - near_bottom_left[2] as i32).abs() < 20,
            "expected background near the logical bottom-left corner, got {near_bottom_left:?}"
        );
    }

    #[test]
    fn empty_rectangle_yields_empty_buffer() {
        let bytes = encode_png(20, 20);
        let mut decoder =
            ImageCrateDecoder::open(Cursor::new(bytes), "t.png", Orientation::Normal).unwrap();

        let region =
            read_region(&mut decoder, 20, 20, Rect::new(30, 30, 0, 0), Orientation::Normal)
                .unwrap();
        assert_eq!(region.dimensions(), (0, 0));
    }
}
