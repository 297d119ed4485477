// SHA-256 fingerprints used to tell whether a drawing source actually changed.

use image::RgbaImage;
use sha2::{Digest, Sha256};

/// Fingerprint of an RGBA image: `width || height || pixels`, lowercase hex.
pub fn image_fingerprint(image: &RgbaImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image.width().to_le_bytes());
    hasher.update(image.height().to_le_bytes());
    hasher.update(image.as_raw());
    hex::encode(hasher.finalize())
}

/// Fingerprint of raw journal text.
pub fn text_fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}
