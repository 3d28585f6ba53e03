//! Shared pyramid-building helpers used by both the in-memory and
//! memory-saving strategies: the outer level loop (level `Z` downto `0`,
//! row-major tile emission, ceiling-halve between levels).

use std::io::{Seek, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use image::imageops::{self, FilterType};
use image::DynamicImage;

use crate::archive::ArchivePackager;
use crate::error::TilerError;
use crate::geometry::{tile_bounds, tiles_per_level};
use crate::pixel::normalize;
use crate::region::crop;
use crate::tile::JpegTileEncoder;

/// Halve `image` by bicubic (Catmull-Rom) resampling, with ceiling-rounded
/// target dimensions.
pub fn halve_ceil(image: &DynamicImage) -> DynamicImage {
    let (w, h) = (image.width(), image.height());
    let target_w = w.div_ceil(2).max(1);
    let target_h = h.div_ceil(2).max(1);
    image.resize_exact(target_w, target_h, FilterType::CatmullRom)
}

/// Emit every tile of one fully-materialized level image, in row-major
/// `(y asc, x asc)` order, incrementing `counter` once per tile written.
pub fn emit_level<W: Write + Seek>(
    level_image: &DynamicImage,
    z: u32,
    encoder: &JpegTileEncoder,
    packager: &mut ArchivePackager<W>,
    counter: &AtomicU64,
) -> Result<(), TilerError> {
    let (level_w, level_h) = (level_image.width(), level_image.height());
    let (tiles_x, tiles_y) = tiles_per_level(level_w, level_h);

    for y in 0..tiles_y {
        for x in 0..tiles_x {
            let bounds = tile_bounds(level_w, level_h, x, y);
            if bounds.is_empty() {
                continue;
            }
            let tile_image = crop(level_image, bounds);
            let canonical = normalize(&tile_image);
            let jpeg = encoder.encode(&canonical, z, y, x)?;
            packager.write_tile(z, y, x, &jpeg)?;
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }
    Ok(())
}

/// Drive the level loop downward from `z` (inclusive) to `0`, emitting
/// every level's tiles and halving between levels. `image` must already be
/// the fully-materialized level-`z` image.
pub fn emit_cascade<W: Write + Seek>(
    mut image: DynamicImage,
    mut z: u32,
    encoder: &JpegTileEncoder,
    packager: &mut ArchivePackager<W>,
    counter: &AtomicU64,
) -> Result<(), TilerError> {
    loop {
        emit_level(&image, z, encoder, packager, counter)?;
        if z == 0 {
            return Ok(());
        }
        image = halve_ceil(&image);
        z -= 1;
    }
}

/// Vertically concatenate `top` above `bottom`, both full source width.
pub fn vconcat(top: &image::RgbImage, bottom: &image::RgbImage) -> image::RgbImage {
    debug_assert_eq!(top.width(), bottom.width());
    let width = top.width();
    let height = top.height() + bottom.height();
    let mut out = image::RgbImage::new(width, height);
    imageops::replace(&mut out, top, 0, 0);
    imageops::replace(&mut out, bottom, 0, top.height() as i64);
    out
}

/// The first `rows` rows of `image` (rows `0..rows`).
pub fn crop_top_rows(image: &image::RgbImage, rows: u32) -> image::RgbImage {
    imageops::crop_imm(image, 0, 0, image.width(), rows).to_image()
}

/// The last single row of `image`.
pub fn last_row(image: &image::RgbImage) -> image::RgbImage {
    imageops::crop_imm(image, 0, image.height() - 1, image.width(), 1).to_image()
}
