//! EXIF orientation extraction.
//!
//! A failed read degrades to [`Orientation::DEFAULT`] rather than failing
//! the invocation: the failure is logged as a swallowed
//! [`TilerError::MetadataExtraction`], never propagated to the caller.

use std::io::{Read, Seek};

use crate::error::TilerError;
use crate::orientation::Orientation;

/// Read the EXIF orientation tag from `source`, rewinding it afterwards so
/// the caller can still hand the same stream to an image decoder.
///
/// Returns `Orientation::DEFAULT` on any failure: no EXIF segment, no
/// orientation tag, or an out-of-range tag value. `path` is used only for
/// the swallowed error's log context.
pub fn read_orientation<R: Read + Seek>(source: &mut R, path: &str) -> Orientation {
    let result = (|| -> Result<Orientation, TilerError> {
        let exif_reader = exif::Reader::new();
        let mut buffered = std::io::BufReader::new(&mut *source);
        let fields = exif_reader
            .read_from_container(&mut buffered)
            .map_err(|e| metadata_error(path, e.to_string()))?;

        let field = fields
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .ok_or_else(|| metadata_error(path, "no orientation tag present"))?;

        let code = field
            .value
            .get_uint(0)
            .ok_or_else(|| metadata_error(path, "orientation tag has no integer value"))?;

        Orientation::from_exif(code as u16).map_err(|e| metadata_error(path, e.to_string()))
    })();

    // Rewind so a subsequent image decode sees the stream from the start,
    // regardless of how far the EXIF reader advanced it.
    let _ = source.seek(std::io::SeekFrom::Start(0));

    match result {
        Ok(orientation) => orientation,
        Err(err) => {
            tracing::info!(error = %err, "EXIF orientation unreadable, degrading to default");
            Orientation::DEFAULT
        }
    }
}

fn metadata_error(path: &str, reason: impl Into<String>) -> TilerError {
    TilerError::MetadataExtraction {
        path: path.to_string(),
        reason: reason.into(),
    }
}
