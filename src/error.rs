use thiserror::Error;

/// Errors that can occur while building a tile pyramid.
///
/// A failed EXIF read degrades to orientation 1 rather than surfacing as an
/// error (see [`TilerError::MetadataExtraction`]'s doc); everything else
/// aborts the current [`crate::tile`] invocation.
#[derive(Debug, Error)]
pub enum TilerError {
    /// No decoder accepts the source bytes.
    #[error("input not decodable: {path}: {reason}")]
    InputNotDecodable { path: String, reason: String },

    /// Filesystem or archive I/O failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// EXIF metadata could not be read.
    ///
    /// Constructed by [`crate::decode::read_orientation`] on any read
    /// failure; never propagated past that point — it's logged and the
    /// source degrades to orientation 1.
    #[error("metadata extraction failed for {path}: {reason}")]
    MetadataExtraction { path: String, reason: String },

    /// Impossible state: an orientation code outside 1..8, or an invariant
    /// the geometry/orientation math assumes has been violated.
    #[error("internal error: {0}")]
    Internal(String),

    /// Tile JPEG encoding failed; aborts the whole invocation per the
    /// archive packager's failure policy.
    #[error("failed to encode tile (z={z}, x={x}, y={y}): {source}")]
    Encode {
        z: u32,
        x: u32,
        y: u32,
        #[source]
        source: image::ImageError,
    },

    /// Source image region decoding failed.
    #[error("failed to decode region of {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    /// ZIP archive writing failed.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl TilerError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        TilerError::Io {
            path: path.into(),
            source,
        }
    }
}
