//! Tile encoding.
//!
//! A tile is a canonical pixel buffer ([`crate::pixel::CanonicalImage`])
//! produced by the pyramid builder; this module turns it into the JPEG
//! bytes the archive packager writes out.

mod encoder;

pub use encoder::{JpegTileEncoder, DEFAULT_QUALITY_PERCENT};
