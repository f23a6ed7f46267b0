//! Image upload: format sniffing and `data:` URL encoding.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Image errors.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Unsupported image format")]
    UnsupportedFormat,
    #[error("IO error: {0}")]
    Io(String),
}

/// Raster formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
        }
    }

    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/webp" => Some(ImageFormat::WebP),
            "image/gif" => Some(ImageFormat::Gif),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(ImageFormat::Gif);
        }
        None
    }
}

/// Encode image bytes as a `data:` URL, sniffing the format.
pub fn encode_data_url(data: &[u8]) -> Result<String, ImageError> {
    let format = ImageFormat::from_magic_bytes(data).ok_or(ImageError::UnsupportedFormat)?;
    Ok(format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(data)))
}

/// Decode a base64 `data:` URL back into its format and bytes.
pub fn decode_data_url(url: &str) -> Option<(ImageFormat, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    let format = ImageFormat::from_mime_type(mime)?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((format, bytes))
}

/// Read an image file and convert it to a `data:` URL.
#[cfg(not(target_arch = "wasm32"))]
pub fn read_image_file(path: impl AsRef<std::path::Path>) -> Result<String, ImageError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| ImageError::Io(e.to_string()))?;
    log::debug!("Read {} bytes of image data from {:?}", data.len(), path);
    encode_data_url(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_magic_bytes() {
        assert_eq!(ImageFormat::from_magic_bytes(&PNG_HEADER), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a.."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_magic_bytes(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_magic_bytes(b"hello"), None);
        assert_eq!(ImageFormat::from_magic_bytes(&[]), None);
    }

    #[test]
    fn test_data_url_roundtrip() {
        let url = encode_data_url(&PNG_HEADER).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        let (format, bytes) = decode_data_url(&url).unwrap();
        assert_eq!(format, ImageFormat::Png);
        assert_eq!(bytes, PNG_HEADER);
    }

    #[test]
    fn test_unsupported_bytes() {
        assert!(matches!(encode_data_url(b"plain text"), Err(ImageError::UnsupportedFormat)));
    }

    #[test]
    fn test_read_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, PNG_HEADER).unwrap();
        let url = read_image_file(&path).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let missing = read_image_file(dir.path().join("missing.png"));
        assert!(matches!(missing, Err(ImageError::Io(_))));
    }
}
