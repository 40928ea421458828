use image::GrayImage;
use imageproc::contrast::otsu_level;
use imageproc::distance_transform::Norm;
use imageproc::morphology;
use kornia::imgproc;
use tracing::debug;

use super::kornia_io::{gray_from_kornia, gray_like, gray_to_kornia};
use crate::error::InternalComputationError;
use crate::params::{AnalysisConfig, ThresholdMode};

/// Foreground value in a [`BinaryMask`].
pub const FOREGROUND: u8 = 255;

/// Single-channel mask where colony candidates are [`FOREGROUND`] and the
/// background is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask(GrayImage);

impl BinaryMask {
    /// Treats every non-zero pixel of `img` as foreground.
    pub fn from_nonzero(mut img: GrayImage) -> Self {
        for px in img.pixels_mut() {
            if px[0] != 0 {
                px[0] = FOREGROUND;
            }
        }
        Self(img)
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.0
    }

    pub fn into_image(self) -> GrayImage {
        self.0
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    pub fn foreground_pixels(&self) -> usize {
        self.0.as_raw().iter().filter(|&&v| v != 0).count()
    }
}

/// Maps the 0..=100 sensitivity knob onto an intensity threshold.
///
/// `T = 255 - trunc(sensitivity / 100 * 150 + 20)`, so the threshold spans
/// 235 (sensitivity 0) down to 85 (sensitivity 100).
pub fn threshold_for_sensitivity(sensitivity: u8) -> u8 {
    let offset = (f64::from(sensitivity) / 100.0 * 150.0 + 20.0) as i32;
    (255 - offset).clamp(0, 255) as u8
}

/// Threshold the configured mode picks for this intensity grid.
pub fn select_threshold(intensity: &GrayImage, sensitivity: u8, mode: ThresholdMode) -> u8 {
    match mode {
        ThresholdMode::Sensitivity => threshold_for_sensitivity(sensitivity),
        ThresholdMode::Otsu => otsu_level(intensity),
    }
}

/// Inverse binarization: pixels at or below `threshold` become foreground.
pub fn binarize(
    intensity: &GrayImage,
    threshold: u8,
) -> Result<BinaryMask, InternalComputationError> {
    let src = gray_to_kornia(intensity)?;
    let mut dst = gray_like(src.size())?;
    imgproc::threshold::threshold_binary_inverse(&src, &mut dst, threshold, FOREGROUND)?;
    Ok(BinaryMask(gray_from_kornia(&dst)?))
}

/// Morphological opening with a square structuring element of the given
/// radius (radius 1 is 3x3). Zero leaves the mask as is.
pub fn open(mask: BinaryMask, radius: u8) -> BinaryMask {
    if radius == 0 {
        return mask;
    }
    BinaryMask(morphology::open(&mask.0, Norm::LInf, radius))
}

pub fn segment(
    intensity: &GrayImage,
    sensitivity: u8,
    config: &AnalysisConfig,
) -> Result<BinaryMask, InternalComputationError> {
    let threshold = select_threshold(intensity, sensitivity, config.threshold_mode);
    let raw = binarize(intensity, threshold)?;
    let raw_foreground = raw.foreground_pixels();
    let mask = open(raw, config.opening_radius);
    debug!(
        threshold,
        mode = ?config.threshold_mode,
        raw_foreground,
        foreground = mask.foreground_pixels(),
        "segmented intensity grid"
    );
    Ok(mask)
}
