//! In-memory pyramid builder: level `Z` is obtained by a single full-image
//! region read; every lower level is produced by halving the level above
//! it in memory. Used when the source comfortably fits in memory.

use std::io::{Seek, Write};
use std::sync::atomic::AtomicU64;

use crate::archive::ArchivePackager;
use crate::decode::ImageDecoder;
use crate::error::TilerError;
use crate::geometry::Rect;
use crate::orientation::Orientation;
use crate::region::read_region;
use crate::tile::JpegTileEncoder;

use super::strategy::emit_cascade;

/// Build the full pyramid by materializing level `z_max` in one region
/// read, then halving downward to level 0.
pub fn build<W: Write + Seek>(
    decoder: &mut dyn ImageDecoder,
    logical_width: u32,
    logical_height: u32,
    orientation: Orientation,
    z_max: u32,
    encoder: &JpegTileEncoder,
    packager: &mut ArchivePackager<W>,
    counter: &AtomicU64,
) -> Result<(), TilerError> {
    let full_rect = Rect::new(0, 0, logical_width, logical_height);
    let full_image = read_region(
        decoder,
        logical_width,
        logical_height,
        full_rect,
        orientation,
    )?;

    emit_cascade(full_image, z_max, encoder, packager, counter)
}
