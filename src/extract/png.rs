// image crate: RGBA buffers <-> PNG bytes

use crate::error::InkError;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Encode an RGBA image (alpha preserved) to PNG bytes.
pub fn encode_png(image: &RgbaImage) -> crate::error::Result<Vec<u8>> {
    if image.width() == 0 || image.height() == 0 {
        return Err(InkError::export(format!(
            "Cannot encode an empty {}x{} image as PNG",
            image.width(),
            image.height()
        )));
    }

    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| InkError::export(e.to_string()))?;

    Ok(buf.into_inner())
}

/// Decode PNG (or any format the image crate sniffs) bytes into RGBA.
pub fn decode_rgba(bytes: &[u8]) -> crate::error::Result<RgbaImage> {
    let decoded = image::load_from_memory(bytes)?;
    Ok(decoded.to_rgba8())
}
