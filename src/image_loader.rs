//! # Image Loading
//!
//! Resolves image sources from file paths, data URIs, or raw base64 strings
//! and reads their pixel dimensions. Layout only needs the size, so pixels
//! are never decoded: the `image` crate reads the header and stops.

use std::io::Cursor;

use crate::error::{LayoutError, Result};
use crate::model::ImageSpec;

/// An image whose header has been read.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub spec: ImageSpec,
    /// Detected container format, if the header was recognised.
    pub format: Option<image::ImageFormat>,
    /// Size of the encoded source in bytes.
    pub byte_len: usize,
}

/// Load an image from a source string.
///
/// Supported `src` formats:
/// - `data:image/...;base64,...`: data URI
/// - File path (absolute or relative): read from disk
/// - Raw base64-encoded image data
pub fn load_image(src: &str) -> Result<LoadedImage> {
    let raw_bytes = read_source_bytes(src).map_err(LayoutError::Image)?;
    decode_dimensions(&raw_bytes)
}

/// Resolve the source string to raw bytes. Shared with font loading.
pub(crate) fn read_source_bytes(src: &str) -> std::result::Result<Vec<u8>, String> {
    // Data URI: data:image/png;base64,iVBOR...
    if src.starts_with("data:") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| "Invalid data URI: missing comma".to_string())?;
        return base64_decode(&src[comma_pos + 1..]);
    }

    // Only explicit path prefixes count as paths; base64 text contains '/'.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        #[cfg(not(target_arch = "wasm32"))]
        {
            return std::fs::read(src)
                .map_err(|e| format!("Failed to read '{}': {}", src, e));
        }
        #[cfg(target_arch = "wasm32")]
        {
            return Err(format!(
                "File paths are not supported in WASM: '{}'. Use data URIs or base64.",
                src
            ));
        }
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> std::result::Result<Vec<u8>, String> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| format!("Base64 decode error: {}", e))
}

/// Read the pixel size from encoded image bytes.
pub fn decode_dimensions(data: &[u8]) -> Result<LoadedImage> {
    if data.len() < 4 {
        return Err(LayoutError::Image("Image data too short".to_string()));
    }

    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| LayoutError::Image(format!("Format detection error: {}", e)))?;
    let format = reader.format();
    if format.is_none() {
        return Err(LayoutError::Image(
            "Unsupported image format (expected JPEG, PNG or WebP)".to_string(),
        ));
    }

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| LayoutError::Image(format!("Failed to read image dimensions: {}", e)))?;
    if width == 0 || height == 0 {
        return Err(LayoutError::InvalidDimensions(format!(
            "image is {width}x{height} pixels"
        )));
    }
    log::debug!("decoded {:?} header: {}x{} px", format, width, height);

    Ok(LoadedImage {
        spec: ImageSpec::new(width, height),
        format,
        byte_len: data.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_fn(width, height, |_, _| image::Rgba([255, 0, 0, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            width,
            height,
            image::ColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn test_invalid_data_uri() {
        let result = load_image("data:image/png;base64");
        assert!(matches!(result, Err(LayoutError::Image(_))));
    }

    #[test]
    fn test_too_short_data() {
        assert!(decode_dimensions(&[0x00, 0x01]).is_err());
    }

    #[test]
    fn test_unsupported_format() {
        assert!(decode_dimensions(&[0x00, 0x01, 0x02, 0x03, 0x04]).is_err());
    }

    #[test]
    fn test_png_dimensions() {
        let loaded = decode_dimensions(&png_bytes(8, 3)).unwrap();
        assert_eq!(loaded.spec, ImageSpec::new(8, 3));
        assert_eq!(loaded.format, Some(image::ImageFormat::Png));
    }

    #[test]
    fn test_jpeg_dimensions() {
        let img = image::RgbImage::from_fn(4, 2, |_, _| image::Rgb([0, 128, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 4, 2, image::ColorType::Rgb8)
            .unwrap();

        let loaded = decode_dimensions(&buf).unwrap();
        assert_eq!(loaded.spec, ImageSpec::new(4, 2));
        assert_eq!(loaded.format, Some(image::ImageFormat::Jpeg));
    }

    #[test]
    fn test_base64_data_uri_and_raw_base64() {
        use base64::Engine;
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes(5, 7));

        let from_uri = load_image(&format!("data:image/png;base64,{}", b64)).unwrap();
        assert_eq!(from_uri.spec, ImageSpec::new(5, 7));

        let from_raw = load_image(&b64).unwrap();
        assert_eq!(from_raw.spec, ImageSpec::new(5, 7));
    }

    #[test]
    fn test_missing_file() {
        let result = load_image("./definitely/not/here.png");
        assert!(matches!(result, Err(LayoutError::Image(_))));
    }
}
