//! Artwork for secret items.
//!
//! Images are stored inline, base64-encoded, next to the item they belong
//! to. Loading is the one asynchronous operation in the crate.

use crate::world::ItemImage;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Largest accepted image file.
pub const MAX_IMAGE_BYTES: u64 = 2 * 1024 * 1024;

/// Errors from loading an image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported image format (expected PNG, JPEG, GIF or WebP)")]
    UnsupportedFormat,

    #[error("Image is too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },
}

/// Media type from the leading magic bytes.
pub fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Encode raw image bytes.
pub fn encode_image(bytes: &[u8]) -> Result<ItemImage, ImageError> {
    let size = bytes.len() as u64;
    if size > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge {
            size,
            max: MAX_IMAGE_BYTES,
        });
    }
    let media_type = sniff_media_type(bytes).ok_or(ImageError::UnsupportedFormat)?;
    Ok(ItemImage {
        media_type: media_type.to_string(),
        data: STANDARD.encode(bytes),
    })
}

/// Read an image file and encode it.
pub async fn load_image(path: impl AsRef<Path>) -> Result<ItemImage, ImageError> {
    let path = path.as_ref();

    let size = fs::metadata(path).await?.len();
    if size > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge {
            size,
            max: MAX_IMAGE_BYTES,
        });
    }

    let bytes = fs::read(path).await?;
    let image = encode_image(&bytes)?;
    tracing::debug!(path = %path.display(), media_type = %image.media_type, "image loaded");
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_sniff() {
        assert_eq!(sniff_media_type(PNG_HEADER), Some("image/png"));
        assert_eq!(sniff_media_type(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_media_type(b"GIF89a...."), Some("image/gif"));
        assert_eq!(sniff_media_type(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_media_type(b"hello world"), None);
        assert_eq!(sniff_media_type(b""), None);
    }

    #[test]
    fn test_encode() {
        let image = encode_image(PNG_HEADER).unwrap();
        assert_eq!(image.media_type, "image/png");
        assert_eq!(STANDARD.decode(&image.data).unwrap(), PNG_HEADER);
    }

    #[test]
    fn test_encode_rejects_large() {
        let mut bytes = PNG_HEADER.to_vec();
        bytes.resize(MAX_IMAGE_BYTES as usize + 1, 0);
        assert!(matches!(
            encode_image(&bytes),
            Err(ImageError::TooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_image_from_disk() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("sword.png");
        std::fs::write(&path, PNG_HEADER).unwrap();

        let image = load_image(&path).await.unwrap();
        assert_eq!(image.media_type, "image/png");

        let text = temp_dir.path().join("notes.txt");
        std::fs::write(&text, "not an image").unwrap();
        assert!(matches!(
            load_image(&text).await,
            Err(ImageError::UnsupportedFormat)
        ));

        assert!(matches!(
            load_image(temp_dir.path().join("missing.png")).await,
            Err(ImageError::Io(_))
        ));
    }
}
