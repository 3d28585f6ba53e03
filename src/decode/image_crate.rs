use std::io::{Cursor, Read, Seek};

use image::{imageops, DynamicImage, GenericImageView};

use super::ImageDecoder;
use crate::error::TilerError;
use crate::geometry::Rect;
use crate::orientation::Orientation;

/// [`ImageDecoder`] backed by the `image` crate.
///
/// Decodes the whole source once at construction (the `image` crate has no
/// region-decode entry point) and serves [`ImageDecoder::decode_region`]
/// from in-memory crops of that buffer.
pub struct ImageCrateDecoder {
    image: DynamicImage,
    orientation: Orientation,
    path: String,
}

impl ImageCrateDecoder {
    /// Open and fully decode `source`. `path` is used only for error
    /// context.
    pub fn open<R: Read + Seek>(
        mut source: R,
        path: &str,
        orientation: Orientation,
    ) -> Result<Self, TilerError> {
        let mut bytes = Vec::new();
        source
            .read_to_end(&mut bytes)
            .map_err(|e| TilerError::io(path, e))?;

        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| TilerError::io(path, e))?;

        let image = reader.decode().map_err(|e| TilerError::InputNotDecodable {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            image,
            orientation,
            path: path.to_string(),
        })
    }
}

impl ImageDecoder for ImageCrateDecoder {
    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn decode_region(&mut self, rect: Rect) -> Result<DynamicImage, TilerError> {
        let (width, height) = self.dimensions();
        if rect.is_empty() {
            return Ok(DynamicImage::new_rgb8(0, 0));
        }
        if rect.x + rect.width > width || rect.y + rect.height > height {
            return Err(TilerError::Decode {
                path: self.path.clone(),
                source: image::ImageError::Parameter(image::error::ParameterError::from_kind(
                    image::error::ParameterErrorKind::DimensionMismatch,
                )),
            });
        }

        let cropped = imageops::crop_imm(&self.image, rect.x, rect.y, rect.width, rect.height);
        Ok(cropped.to_image().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn encode_test_png(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(w, h, |x, y| image::Rgb([x as u8, y as u8, 0]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn decode_region_crops_exact_rectangle() {
        let bytes = encode_test_png(20, 10);
        let mut decoder =
            ImageCrateDecoder::open(Cursor::new(bytes), "test.png", Orientation::Normal).unwrap();

        assert_eq!(decoder.dimensions(), (20, 10));

        let region = decoder
            .decode_region(Rect::new(5, 2, 8, 4))
            .unwrap();
        assert_eq!(region.dimensions(), (8, 4));
    }

    #[test]
    fn invalid_bytes_are_not_decodable() {
        let bytes = vec![0u8; 16];
        let result = ImageCrateDecoder::open(Cursor::new(bytes), "bad.bin", Orientation::Normal);
        assert!(result.is_err());
    }

    #[test]
    fn out_of_bounds_region_is_a_decode_error() {
        let bytes = encode_test_png(20, 10);
        let mut decoder =
            ImageCrateDecoder::open(Cursor::new(bytes), "test.png", Orientation::Normal).unwrap();

        let result = decoder.decode_region(Rect::new(15, 5, 10, 10));
        assert!(matches!(result, Err(TilerError::Decode { .. })));
    }
}
