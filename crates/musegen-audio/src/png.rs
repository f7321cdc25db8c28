use image::{ImageFormat, RgbImage};
use musegen_core::CodecError;
use std::io::Cursor;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Encode an RGB bitmap as PNG.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, CodecError> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| CodecError::ImageEncode(e.to_string()))?;
    let bytes = cursor.into_inner();
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        bytes = bytes.len(),
        "encoded PNG"
    );
    Ok(bytes)
}

/// Decode a PNG or JPEG image into an RGB bitmap.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, CodecError> {
    let image =
        image::load_from_memory(bytes).map_err(|e| CodecError::ImageDecode(e.to_string()))?;
    Ok(image.to_rgb8())
}

pub fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_SIGNATURE)
}
