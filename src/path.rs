//! Path resolver: derive the output `.iview2` archive path from a base
//! directory, an optional derivative identifier, and a relative image path.

use std::path::{Path, PathBuf};

/// Resolve the archive output path for an image.
///
/// - When `derivate` is `None`, the image's base directory is `base_dir`
///   itself.
/// - Otherwise `derivate` is split on `'_'`. Every part except the last is
///   appended as a directory segment verbatim. The last part, if longer
///   than 3 characters, contributes two further segments: its
///   second-to-last and third-to-last characters, then its last two
///   characters (a bucketing scheme, matching a two-level fan-out by id
///   suffix); otherwise it is appended as-is. Finally `derivate` itself is
///   appended as a directory.
/// - `image_path`'s leading `/` is stripped, its last `.`-extension (if
///   any) is dropped, and `.iview2` is appended; the result is resolved
///   against the computed base directory.
pub fn resolve_archive_path(base_dir: &Path, derivate: Option<&str>, image_path: &str) -> PathBuf {
    let mut base = base_dir.to_path_buf();

    if let Some(derivate) = derivate {
        let parts: Vec<&str> = derivate.split('_').collect();
        if let Some((last, rest)) = parts.split_last() {
            for part in rest {
                base.push(part);
            }
            if last.len() > 3 {
                let chars: Vec<char> = last.chars().collect();
                let n = chars.len();
                let bucket: String = chars[n - 4..n - 2].iter().collect();
                let tail: String = chars[n - 2..].iter().collect();
                base.push(bucket);
                base.push(tail);
            } else {
                base.push(last);
            }
        }
        base.push(derivate);
    }

    let relative = image_path.strip_prefix('/').unwrap_or(image_path);
    let relative_path = Path::new(relative);

    let stem_path = match relative_path.extension() {
        Some(_) => relative_path.with_extension(""),
        None => relative_path.to_path_buf(),
    };

    let mut archive_name = stem_path.into_os_string();
    archive_name.push(".iview2");

    base.join(archive_name)
}
