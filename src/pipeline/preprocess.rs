use image::imageops;
use image::{GrayImage, RgbImage};
use imageproc::filter::gaussian_blur_f32;
use kornia::imgproc;
use tracing::debug;

use super::equalize::equalize_local;
use super::kornia_io::{gray_from_kornia, gray_like, rgb_to_kornia};
use crate::error::InternalComputationError;
use crate::params::AnalysisConfig;

/// Output of the preprocessing stage.
///
/// `color` is the (possibly downscaled) image every later stage measures
/// against; `intensity` is its enhanced single-channel counterpart.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub color: RgbImage,
    pub intensity: GrayImage,
}

pub fn preprocess(
    color: RgbImage,
    config: &AnalysisConfig,
) -> Result<Preprocessed, InternalComputationError> {
    let color = downscale(color, config.max_width);
    let gray = to_intensity(&color)?;
    let equalized = equalize_local(&gray, config.clahe_tiles, config.clahe_clip_limit);
    let intensity = gaussian_blur_f32(&equalized, config.blur_sigma);
    debug!(
        width = intensity.width(),
        height = intensity.height(),
        "preprocessed intensity grid"
    );
    Ok(Preprocessed { color, intensity })
}

/// Shrinks images wider than `max_width` with area averaging, keeping the
/// aspect ratio. Narrower images pass through untouched.
pub fn downscale(color: RgbImage, max_width: u32) -> RgbImage {
    let (width, height) = color.dimensions();
    if width <= max_width {
        return color;
    }
    let new_height = (height as f64 * max_width as f64 / width as f64)
        .round()
        .max(1.0) as u32;
    debug!(width, height, new_width = max_width, new_height, "downscaling");
    imageops::thumbnail(&color, max_width, new_height)
}

/// Luma conversion.
pub fn to_intensity(color: &RgbImage) -> Result<GrayImage, InternalComputationError> {
    let image = rgb_to_kornia(color)?;
    let mut gray = gray_like(image.size())?;
    imgproc::color::gray_from_rgb_u8(&image, &mut gray)?;
    gray_from_kornia(&gray)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn wide_images_are_capped_keeping_aspect() {
        let img = RgbImage::from_pixel(1600, 1000, Rgb([255, 255, 255]));
        let out = downscale(img, 800);
        assert_eq!(out.dimensions(), (800, 500));

        let small = RgbImage::from_pixel(640, 480, Rgb([1, 2, 3]));
        assert_eq!(downscale(small, 800).dimensions(), (640, 480));
    }

    #[test]
    fn intensity_tracks_luma() {
        let mut img = RgbImage::from_pixel(4, 1, Rgb([255, 255, 255]));
        img.put_pixel(1, 0, Rgb([0, 0, 0]));
        img.put_pixel(2, 0, Rgb([0, 255, 0]));
        img.put_pixel(3, 0, Rgb([0, 0, 255]));
        let gray = to_intensity(&img).expect("gray");
        assert!(gray.get_pixel(0, 0)[0] >= 250);
        assert!(gray.get_pixel(1, 0)[0] <= 5);
        // green dominates luma, blue contributes least
        assert!(gray.get_pixel(2, 0)[0] > gray.get_pixel(3, 0)[0]);
    }

    #[test]
    fn uniform_white_stays_bright() {
        let img = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));
        let out = preprocess(img, &AnalysisConfig::default()).expect("preprocess");
        assert_eq!(out.intensity.dimensions(), (100, 100));
        assert!(out.intensity.pixels().all(|&Luma([v])| v >= 250));
    }
}
