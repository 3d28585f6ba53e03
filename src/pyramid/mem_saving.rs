//! Memory-saving pyramid builder: level `Z` is never materialized in full.
//! Instead it's processed in horizontal megatile strips, each region-read,
//! tiled, and halved in turn; the halved strips accumulate into the
//! level-`Z-1` image, which feeds the ordinary (small, in-memory) cascade
//! for every level below it.
//!
//! The one subtlety this buys: halving a strip whose row count is odd
//! leaves one row that can't pair with anything *within* that strip. That
//! row is carried forward and prepended to the next strip before halving,
//! so the result is bit-identical to halving the whole level-`Z` image at
//! once (the "1-pixel mega-tile rest" case). With `megatile_size` held to
//! the required multiple of `TILE_SIZE`, only the image's own final strip
//! can ever be odd-heighted, and nothing needs to be carried past it — the
//! carry path exists for robustness against a misconfigured
//! `megatile_size` rather than for the common case.

use std::io::{Seek, Write};
use std::sync::atomic::AtomicU64;

use image::{imageops::FilterType, DynamicImage, RgbImage};

use crate::archive::ArchivePackager;
use crate::decode::ImageDecoder;
use crate::error::TilerError;
use crate::geometry::{level_dimensions, Rect};
use crate::orientation::Orientation;
use crate::region::read_region;
use crate::tile::JpegTileEncoder;

use super::strategy::{crop_top_rows, emit_cascade, emit_level, last_row, vconcat};

pub fn build<W: Write + Seek>(
    decoder: &mut dyn ImageDecoder,
    logical_width: u32,
    logical_height: u32,
    orientation: Orientation,
    z_max: u32,
    megatile_size: u32,
    encoder: &JpegTileEncoder,
    packager: &mut ArchivePackager<W>,
    counter: &AtomicU64,
) -> Result<(), TilerError> {
    debug_assert_eq!(
        megatile_size % crate::geometry::TILE_SIZE,
        0,
        "megatile_size must be a multiple of TILE_SIZE so strips stay tile-aligned"
    );

    if z_max == 0 {
        // Already fits in a single tile: no streaming needed at all.
        let full_rect = Rect::new(0, 0, logical_width, logical_height);
        let full_image = read_region(
            decoder,
            logical_width,
            logical_height,
            full_rect,
            orientation,
        )?;
        return emit_level(&full_image, 0, encoder, packager, counter);
    }

    let (next_w, next_h) = level_dimensions(logical_width, logical_height, z_max - 1, z_max);
    let mut accumulator = RgbImage::new(next_w, next_h);
    let mut write_row = 0u32;
    let mut carry: Option<RgbImage> = None;

    let mut y0 = 0u32;
    while y0 < logical_height {
        let strip_height = megatile_size.min(logical_height - y0);
        let rect = Rect::new(0, y0, logical_width, strip_height);
        let band = read_region(
            decoder,
            logical_width,
            logical_height,
            rect,
            orientation,
        )?
        .to_rgb8();

        emit_band_tiles(&band, y0, logical_width, logical_height, z_max, encoder, packager, counter)?;

        let combined = match carry.take() {
            Some(row) => vconcat(&row, &band),
            None => band,
        };

        let is_last_strip = y0 + strip_height >= logical_height;
        let combined_height = combined.height();

        let (usable_height, new_carry) = if combined_height % 2 == 1 && !is_last_strip {
            (combined_height - 1, Some(last_row(&combined)))
        } else {
            (combined_height, None)
        };
        carry = new_carry;

        if usable_height > 0 {
            let usable = if usable_height == combined_height {
                combined
            } else {
                crop_top_rows(&combined, usable_height)
            };
            let target_w = next_w;
            let target_h = usable_height.div_ceil(2).max(1);
            let halved = image::imageops::resize(&usable, target_w, target_h, FilterType::CatmullRom);
            image::imageops::replace(&mut accumulator, &halved, 0, write_row as i64);
            write_row += target_h;
        }

        y0 += strip_height;
    }

    debug_assert_eq!(write_row, next_h, "accumulated level Z-1 image must fill exactly");

    emit_cascade(
        DynamicImage::ImageRgb8(accumulator),
        z_max - 1,
        encoder,
        packager,
        counter,
    )
}

/// Emit every level-`z_max` tile whose full row range lies within
/// `[band_y0, band_y0 + band.height())`. Megatile strip heights are a
/// multiple of [`crate::geometry::TILE_SIZE`] (except possibly the final,
/// shorter strip at the image's bottom edge), so tile rows never straddle
/// a strip boundary.
fn emit_band_tiles<W: Write + Seek>(
    band: &RgbImage,
    band_y0: u32,
    logical_width: u32,
    logical_height: u32,
    z: u32,
    encoder: &JpegTileEncoder,
    packager: &mut ArchivePackager<W>,
    counter: &AtomicU64,
) -> Result<(), TilerError> {
    use crate::geometry::{tile_bounds, TILE_SIZE};
    use crate::pixel::normalize;
    use std::sync::atomic::Ordering;

    let tiles_x = logical_width.div_ceil(TILE_SIZE).max(1);
    let band_y1 = band_y0 + band.height();

    let mut y = band_y0 / TILE_SIZE;
    loop {
        let row_top = y * TILE_SIZE;
        if row_top >= band_y1 || row_top >= logical_height {
            break;
        }
        let bounds_probe = tile_bounds(logical_width, logical_height, 0, y);
        if bounds_probe.is_empty() {
            break;
        }
        let row_bottom = row_top + bounds_probe.height;
        if row_bottom > band_y1 {
            break;
        }

        for x in 0..tiles_x {
            let bounds = tile_bounds(logical_width, logical_height, x, y);
            if bounds.is_empty() {
                continue;
            }
            let local_y = bounds.y - band_y0;
            let tile_image = image::imageops::crop_imm(
                band,
                bounds.x,
                local_y,
                bounds.width,
                bounds.height,
            )
            .to_image();
            let canonical = normalize(&DynamicImage::ImageRgb8(tile_image));
            let jpeg = encoder.encode(&canonical, z, y, x)?;
            packager.write_tile(z, y, x, &jpeg)?;
            counter.fetch_add(1, Ordering::SeqCst);
        }
        y += 1;
    }
    Ok(())
}
