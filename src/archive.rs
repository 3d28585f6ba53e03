//! Archive packager: writes tiles and the manifest into the output
//! `.iview2` ZIP container at canonical paths, in the canonical order.

use std::io::{Seek, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::TilerError;
use crate::manifest::PyramidManifest;

/// Appends tiles (descending `z`, ascending `y`, ascending `x`) followed by
/// `imageinfo.xml` into a ZIP sink. Tile payloads are already
/// JPEG-compressed, so entries are stored rather than deflated; the
/// manifest is small enough that compression method there doesn't matter
/// and is stored too, for uniformity.
pub struct ArchivePackager<W: Write + Seek> {
    writer: ZipWriter<W>,
}

impl<W: Write + Seek> ArchivePackager<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: ZipWriter::new(sink),
        }
    }

    /// Append one tile's already-encoded JPEG bytes at `z/y/x.jpg`. Entry
    /// names always use forward slashes, regardless of host OS.
    pub fn write_tile(&mut self, z: u32, y: u32, x: u32, jpeg: &[u8]) -> Result<(), TilerError> {
        let name = format!("{z}/{y}/{x}.jpg");
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.writer.start_file(name, options)?;
        self.writer.write_all(jpeg).map_err(|e| {
            TilerError::io(format!("archive entry {z}/{y}/{x}.jpg"), e)
        })?;
        Ok(())
    }

    /// Append the manifest as `imageinfo.xml`. Must be called after every
    /// tile has been written — it is always the archive's final entry.
    pub fn write_manifest(&mut self, manifest: &PyramidManifest) -> Result<(), TilerError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.writer.start_file("imageinfo.xml", options)?;
        self.writer
            .write_all(manifest.to_xml().as_bytes())
            .map_err(|e| TilerError::io("imageinfo.xml", e))?;
        Ok(())
    }

    /// Finalize the archive. The sink is flushed and the central directory
    /// written; no further entries can be appended afterwards.
    pub fn finish(mut self) -> Result<W, TilerError> {
        Ok(self.writer.finish()?)
    }
}
