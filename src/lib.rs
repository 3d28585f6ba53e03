//! # iview2-tiler
//!
//! Converts a single source raster image into a multi-resolution tile
//! pyramid packaged as a `.iview2` archive (a ZIP container) for deep-zoom
//! viewers, alongside an `imageinfo.xml` manifest describing the pyramid's
//! dimensions, tile count, and derivative identity.
//!
//! ## Architecture
//!
//! - [`geometry`] — pyramid geometry: zoom-level count, tile count, tile bounds
//! - [`orientation`] — EXIF orientation ↔ logical/physical coordinate mapping
//! - [`pixel`] — canonical pixel form coercion (8-bit gray / 24-bit RGB)
//! - [`decode`] — the image decoder collaborator's contract
//! - [`region`] — orientation-aware region decoding built on top of it
//! - [`pyramid`] — the pyramid builder (in-memory and memory-saving strategies)
//! - [`tile`] — JPEG tile encoding
//! - [`archive`] — ZIP archive packaging
//! - [`path`] — output archive path resolution
//! - [`manifest`] — `imageinfo.xml` serialization
//! - [`hooks`] — lifecycle hook contract
//! - [`metrics`] — throughput measurement
//! - [`config`] — CLI argument parsing
//! - [`error`] — crate-wide error type
//!
//! ## Example
//!
//! ```no_run
//! use std::fs::File;
//! use iview2_tiler::tile;
//!
//! let source = File::open("slide.tif").unwrap();
//! let output = File::create("slide.iview2").unwrap();
//! let props = tile(source, output, None, "slide.tif", None, None, 75).unwrap();
//! println!("{}x{}, {} tiles", props.width, props.height, props.tiles_count);
//! ```

pub mod archive;
pub mod config;
pub mod decode;
pub mod error;
pub mod geometry;
pub mod hooks;
pub mod manifest;
pub mod metrics;
pub mod orientation;
pub mod path;
pub mod pixel;
pub mod pyramid;
pub mod region;
pub mod tile;

use std::io::{Read, Seek, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tracing::info;

pub use error::TilerError;
pub use hooks::TilerHooks;
pub use pyramid::Strategy;

use archive::ArchivePackager;
use decode::{read_orientation, ImageCrateDecoder, ImageDecoder};
use manifest::PyramidManifest;
use orientation::logical_dimensions;
use tile::JpegTileEncoder;

/// Result of a successful [`tile`] call: the pyramid's logical dimensions,
/// its zoom-level count, and the total number of tiles written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PyramidProps {
    pub width: u32,
    pub height: u32,
    pub zoom_level: u32,
    pub tiles_count: u64,
}

/// Build a complete tile pyramid from `source` into the `.iview2` archive
/// `output`.
///
/// Orchestration, in order:
/// 1. Read EXIF orientation from `source`, degrading to
///    [`orientation::Orientation::DEFAULT`] on any failure.
/// 2. Invoke `hooks.pre_image_reader_created()`, if a hook is supplied.
/// 3. Open the decoder on `source`. `hooks.post_image_reader_created()`
///    fires afterwards regardless of whether this succeeded.
/// 4. Compute logical dimensions and the zoom-level count.
/// 5. Select a pyramid-building strategy (`strategy_override`, or
///    [`pyramid::select_strategy`] by default) and run it, writing tiles
///    through the archive packager as they're produced.
/// 6. Append the manifest and finalize the archive.
///
/// `derivate` and `image_path` are carried through only as manifest
/// attributes and error context — path resolution for `output` itself is
/// the caller's responsibility (see [`path::resolve_archive_path`]).
#[allow(clippy::too_many_arguments)]
pub fn tile<R, W>(
    mut source: R,
    output: W,
    derivate: Option<&str>,
    image_path: &str,
    mut hooks: Option<&mut dyn TilerHooks>,
    strategy_override: Option<Strategy>,
    jpeg_quality: u8,
) -> Result<PyramidProps, TilerError>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let start = Instant::now();

    let orientation = read_orientation(&mut source, image_path);
    info!(exif_orientation = orientation.exif(), "read EXIF orientation");

    if let Some(h) = hooks.as_mut() {
        h.pre_image_reader_created();
    }

    let decoder_result = ImageCrateDecoder::open(source, image_path, orientation);

    if let Some(h) = hooks.as_mut() {
        h.post_image_reader_created();
    }

    let mut decoder = decoder_result?;

    let (physical_width, physical_height) = decoder.dimensions();
    let (logical_width, logical_height) =
        logical_dimensions(physical_width, physical_height, decoder.orientation());
    let z_max = geometry::zoom_levels(logical_width, logical_height);

    let strategy = strategy_override
        .unwrap_or_else(|| pyramid::select_strategy(logical_width, logical_height));
    info!(
        ?strategy,
        logical_width, logical_height, zoom_level = z_max, "selected pyramid builder strategy"
    );

    let encoder = JpegTileEncoder::new(jpeg_quality);
    let mut packager = ArchivePackager::new(output);
    let counter = AtomicU64::new(0);

    pyramid::build(
        strategy,
        &mut decoder,
        logical_width,
        logical_height,
        orientation,
        z_max,
        &encoder,
        &mut packager,
        &counter,
    )?;

    let tiles_count = counter.load(Ordering::SeqCst);

    let manifest = PyramidManifest {
        derivate,
        path: image_path,
        tiles: tiles_count,
        zoom_level: z_max,
        width: logical_width,
        height: logical_height,
    };
    packager.write_manifest(&manifest)?;
    packager.finish()?;

    let elapsed = start.elapsed();
    let throughput = metrics::mpixels_per_second(logical_width, logical_height, elapsed);
    info!(
        tiles_count,
        throughput_mpixels_per_sec = throughput,
        elapsed_ms = elapsed.as_millis() as u64,
        "pyramid build complete"
    );

    Ok(PyramidProps {
        width: logical_width,
        height: logical_height,
        zoom_level: z_max,
        tiles_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};
    use std::io::Cursor;

    fn encode_png(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(w, h, |x, y| image::Rgb([x as u8, y as u8, 0]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[derive(Default)]
    struct RecordingHooks {
        pre: u32,
        post: u32,
    }

    impl TilerHooks for RecordingHooks {
        fn pre_image_reader_created(&mut self) {
            self.pre += 1;
        }
        fn post_image_reader_created(&mut self) {
            self.post += 1;
        }
    }

    #[test]
    fn small_image_produces_expected_manifest() {
        let bytes = encode_png(800, 600);
        let source = Cursor::new(bytes);
        let mut output = Cursor::new(Vec::new());

        let props = tile(source, &mut output, None, "x.png", None, None, 75).unwrap();
        assert_eq!((props.width, props.height), (800, 600));
        assert_eq!(props.zoom_level, geometry::zoom_levels(800, 600));
        assert_eq!(props.tiles_count, geometry::tile_count(800, 600));

        let mut archive = zip::ZipArchive::new(output).unwrap();
        assert!(archive.by_name("imageinfo.xml").is_ok());
        let top_level = format!("{}/0/0.jpg", props.zoom_level);
        assert!(archive.by_name(&top_level).is_ok());
    }

    #[test]
    fn lifecycle_hooks_fire_exactly_once_each() {
        let bytes = encode_png(100, 100);
        let mut hooks = RecordingHooks::default();
        let mut output = Cursor::new(Vec::new());

        tile(
            Cursor::new(bytes),
            &mut output,
            None,
            "x.png",
            Some(&mut hooks),
            None,
            75,
        )
        .unwrap();

        assert_eq!(hooks.pre, 1);
        assert_eq!(hooks.post, 1);
    }

    #[test]
    fn undecodable_source_still_fires_post_hook() {
        let mut hooks = RecordingHooks::default();
        let mut output = Cursor::new(Vec::new());

        let result = tile(
            Cursor::new(vec![0u8; 16]),
            &mut output,
            None,
            "bad.bin",
            Some(&mut hooks),
            None,
            75,
        );

        assert!(result.is_err());
        assert_eq!(hooks.pre, 1);
        assert_eq!(hooks.post, 1);
    }

    #[test]
    fn manifest_tiles_attribute_matches_actual_tile_count() {
        let bytes = encode_png(3000, 3000);
        let mut output = Cursor::new(Vec::new());

        let props = tile(
            Cursor::new(bytes),
            &mut output,
            Some("junit_derivate_00000001"),
            "foo/bar.tif",
            None,
            None,
            75,
        )
        .unwrap();

        let mut archive = zip::ZipArchive::new(output).unwrap();
        let mut manifest_entry = archive.by_name("imageinfo.xml").unwrap();
        let mut xml = String::new();
        std::io::Read::read_to_string(&mut manifest_entry, &mut xml).unwrap();

        assert!(xml.contains(&format!(r#"tiles="{}""#, props.tiles_count)));
        assert!(xml.contains(r#"derivate="junit_derivate_00000001""#));
    }
}
