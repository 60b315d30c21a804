//! Validation for uploaded recipe images.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};

/// Maximum accepted upload size (2MB), enforced before any decoding.
pub const MAX_FILE_SIZE: usize = 2 * 1024 * 1024;

pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Detect the image format from magic bytes and validate it's allowed.
/// Returns the content type to store alongside the bytes. The client's
/// declared content type is ignored; only the bytes are trusted.
pub fn detect_content_type(data: &[u8]) -> Result<String, String> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("Failed to read image: {}", e))?;

    let format = reader
        .format()
        .ok_or_else(|| "Could not detect image format".to_string())?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(format!(
            "Unsupported image format: {:?}. Allowed: JPEG, PNG, GIF, WebP",
            format
        ));
    }

    Ok(format.to_mime_type().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> Vec<u8> {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(1, 1));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_detects_png_from_bytes() {
        let data = tiny_png();
        assert_eq!(detect_content_type(&data).unwrap(), "image/png");
    }

    #[test]
    fn test_rejects_non_image_bytes() {
        assert!(detect_content_type(b"definitely not an image").is_err());
    }
}
