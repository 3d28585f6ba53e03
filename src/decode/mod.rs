//! Decoder contract.
//!
//! The image decoder is an external collaborator the tiling engine drives
//! but does not own: given a byte stream it reports dimensions and EXIF
//! orientation, and decodes arbitrary physical sub-rectangles. This module
//! defines that contract as a trait ([`ImageDecoder`]) and provides one
//! concrete realization ([`ImageCrateDecoder`]) backed by the `image` crate.
//!
//! `image` has no partial-decode API for JPEG/TIFF/PNG, so
//! `ImageCrateDecoder` decodes the whole source once on open and serves
//! `decode_region` from an in-memory crop of that buffer. The pyramid
//! builder's memory-saving *strategy* still streams in megatile strips and
//! is tested against the same tile-count/tile-identity invariants as the
//! in-memory strategy regardless of what backs `ImageDecoder` underneath.

mod exif;
mod image_crate;

pub use exif::read_orientation;
pub use image_crate::ImageCrateDecoder;

use crate::error::TilerError;
use crate::geometry::Rect;
use crate::orientation::Orientation;
use image::DynamicImage;

/// Format-agnostic interface for reading pixels from a source image.
pub trait ImageDecoder {
    /// Physical (pre-orientation) dimensions of the source, `(width,
    /// height)`.
    fn dimensions(&self) -> (u32, u32);

    /// EXIF orientation of the source. Defaults to [`Orientation::DEFAULT`]
    /// when metadata is absent or unreadable — that degrade happens at
    /// construction time, not here.
    fn orientation(&self) -> Orientation;

    /// Decode exactly the physical rectangle `rect` and return it as a
    /// freshly allocated buffer sized to `rect`.
    fn decode_region(&mut self, rect: Rect) -> Result<DynamicImage, TilerError>;
}
