use image::{DynamicImage, RgbImage};
use tracing::debug;

use crate::error::DecodeError;

/// Decodes PNG, JPEG or any other format the `image` crate recognises into
/// a fresh 3-channel grid. Alpha is dropped, grayscale is expanded.
pub fn decode(bytes: &[u8]) -> Result<RgbImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    let image: DynamicImage = image::load_from_memory(bytes)?;
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(DecodeError::ZeroSized { width, height });
    }
    debug!(width, height, color = ?image.color(), "decoded image");
    Ok(image.to_rgb8())
}
