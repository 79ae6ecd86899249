use crate::models::ImageMime;
use image::ImageFormat;

/// Map a `Content-Type` (or data URL media type) onto the allowed image types.
///
/// Parameters such as `; charset=binary` are ignored and the comparison is
/// case-insensitive. Anything outside jpeg/png/gif yields `None`.
pub fn parse_content_type(value: &str) -> Option<ImageMime> {
    let essence = value.split(';').next().unwrap_or("").trim();
    match essence.to_ascii_lowercase().as_str() {
        "image/jpeg" => Some(ImageMime::Jpeg),
        "image/png" => Some(ImageMime::Png),
        "image/gif" => Some(ImageMime::Gif),
        _ => None,
    }
}

/// Sniff the image type from magic bytes, for sources without a declared type.
pub fn detect_image_mime(bytes: &[u8]) -> Option<ImageMime> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => Some(ImageMime::Jpeg),
        Ok(ImageFormat::Png) => Some(ImageMime::Png),
        Ok(ImageFormat::Gif) => Some(ImageMime::Gif),
        Ok(other) => {
            tracing::debug!("Detected disallowed image format {:?}", other);
            None
        }
        Err(_) => {
            tracing::debug!(
                "Unrecognized image format (first 4 bytes: {:02X?})",
                &bytes[..bytes.len().min(4)]
            );
            None
        }
    }
}
