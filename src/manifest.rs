//! Pyramid manifest: `imageinfo.xml`, the archive's last entry.
//!
//! A single fixed-attribute XML element, emitted with a direct `format!`
//! literal rather than pulling in an XML crate for one fixed shape.
//! Consumers must parse by attribute name, not position: attribute order
//! here isn't guaranteed.

/// Metadata describing a completed pyramid, serialized as the single
/// `<imageinfo>` element.
#[derive(Debug, Clone)]
pub struct PyramidManifest<'a> {
    pub derivate: Option<&'a str>,
    pub path: &'a str,
    pub tiles: u64,
    pub zoom_level: u32,
    pub width: u32,
    pub height: u32,
}

impl<'a> PyramidManifest<'a> {
    /// Render the manifest as a single self-closing `<imageinfo>` element.
    /// `derivate` is an empty string when no derivative context was
    /// provided, matching `path`'s "may be empty" contract.
    pub fn to_xml(&self) -> String {
        let derivate = self.derivate.unwrap_or("");
        format!(
            r#"<imageinfo derivate="{derivate}" path="{path}" tiles="{tiles}" zoomLevel="{zoom_level}" height="{height}" width="{width}"/>"#,
            derivate = xml_escape(derivate),
            path = xml_escape(self.path),
            tiles = self.tiles,
            zoom_level = self.zoom_level,
            height = self.height,
            width = self.width,
        )
    }
}

/// Escape the handful of characters XML attribute values can't contain
/// literally.
fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_six_attributes() {
        let manifest = PyramidManifest {
            derivate: Some("junit_derivate_00000001"),
            path: "foo/bar.tif",
            tiles: 13,
            zoom_level: 2,
            width: 800,
            height: 600,
        };
        let xml = manifest.to_xml();

        assert!(xml.starts_with("<imageinfo "));
        assert!(xml.contains(r#"derivate="junit_derivate_00000001""#));
        assert!(xml.contains(r#"path="foo/bar.tif""#));
        assert!(xml.contains(r#"tiles="13""#));
        assert!(xml.contains(r#"zoomLevel="2""#));
        assert!(xml.contains(r#"width="800""#));
        assert!(xml.contains(r#"height="600""#));
    }

    #[test]
    fn null_derivate_renders_empty_attribute() {
        let manifest = PyramidManifest {
            derivate: None,
            path: "x.tif",
            tiles: 1,
            zoom_level: 0,
            width: 10,
            height: 10,
        };
        assert!(manifest.to_xml().contains(r#"derivate="""#));
    }

    #[test]
    fn special_characters_in_path_are_escaped() {
        let manifest = PyramidManifest {
            derivate: None,
            path: "a&b<c>\"d\"",
            tiles: 1,
            zoom_level: 0,
            width: 1,
            height: 1,
        };
        let xml = manifest.to_xml();
        assert!(!xml.contains("a&b<c>"));
        assert!(xml.contains("a&amp;b&lt;c&gt;&quot;d&quot;"));
    }
}
