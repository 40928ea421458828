use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

const MAX_WIDTH: u32 = 800;
const CLAHE_TILES: u32 = 8;
const CLAHE_CLIP_LIMIT: f32 = 2.0;
// Sigma OpenCV derives for a 5x5 kernel when none is given.
const BLUR_SIGMA: f32 = 1.1;
const OPENING_RADIUS: u8 = 1;
const MIN_AREA: f64 = 2.0;
const MAX_AREA: f64 = 1000.0;
const GRID_COLOR: [u8; 3] = [0, 255, 0];
const COUNT_COLOR: [u8; 3] = [255, 0, 0];
const MARKER_COLOR: [u8; 3] = [255, 0, 0];
const MARKER_RADIUS: i32 = 5;
const SECTOR_MARKER_RADIUS: i32 = 2;
const DIGIT_SCALE: u32 = 2;

pub const DEFAULT_SECTOR_COUNT: u32 = 1;
pub const DEFAULT_SENSITIVITY: u8 = 50;

/// Per-call detection parameters, validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ParameterInput", into = "ParameterInput")]
pub struct DetectionParameters {
    sector_count: u32,
    sensitivity: u8,
}

impl DetectionParameters {
    /// Accepts the raw integers a caller received at its boundary.
    pub fn new(sector_count: i64, sensitivity: i64) -> Result<Self, ConfigurationError> {
        let sector_count = u32::try_from(sector_count)
            .ok()
            .filter(|&n| n >= 1)
            .ok_or(ConfigurationError::SectorCount(sector_count))?;
        let sensitivity = u8::try_from(sensitivity)
            .ok()
            .filter(|&s| s <= 100)
            .ok_or(ConfigurationError::Sensitivity(sensitivity))?;
        Ok(Self {
            sector_count,
            sensitivity,
        })
    }

    pub fn sector_count(&self) -> u32 {
        self.sector_count
    }

    pub fn sensitivity(&self) -> u8 {
        self.sensitivity
    }
}

impl Default for DetectionParameters {
    fn default() -> Self {
        Self {
            sector_count: DEFAULT_SECTOR_COUNT,
            sensitivity: DEFAULT_SENSITIVITY,
        }
    }
}

/// Wire form of [`DetectionParameters`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParameterInput {
    #[serde(default = "default_sectors")]
    pub sectors: i64,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: i64,
}

fn default_sectors() -> i64 {
    DEFAULT_SECTOR_COUNT as i64
}

fn default_sensitivity() -> i64 {
    DEFAULT_SENSITIVITY as i64
}

impl TryFrom<ParameterInput> for DetectionParameters {
    type Error = ConfigurationError;

    fn try_from(input: ParameterInput) -> Result<Self, Self::Error> {
        DetectionParameters::new(input.sectors, input.sensitivity)
    }
}

impl From<DetectionParameters> for ParameterInput {
    fn from(params: DetectionParameters) -> Self {
        Self {
            sectors: params.sector_count as i64,
            sensitivity: params.sensitivity as i64,
        }
    }
}

/// How the binarization threshold is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// Threshold derived from the sensitivity parameter.
    #[default]
    Sensitivity,
    /// Otsu threshold of the smoothed intensity; sensitivity is ignored.
    Otsu,
}

/// Tunables for the whole pipeline.
///
/// Defaults reproduce the calibrated behaviour; override individual fields
/// from a partial JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Images wider than this are downscaled before analysis.
    pub max_width: u32,
    /// Number of tiles per axis for local contrast equalization.
    pub clahe_tiles: u32,
    /// Histogram clip limit, relative to a flat histogram. Zero disables clipping.
    pub clahe_clip_limit: f32,
    pub blur_sigma: f32,
    /// Radius of the square structuring element used by the opening pass.
    pub opening_radius: u8,
    /// Contours must have an area strictly inside `(min_area, max_area)`.
    pub min_area: f64,
    pub max_area: f64,
    pub threshold_mode: ThresholdMode,
    pub style: DrawStyle,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_width: MAX_WIDTH,
            clahe_tiles: CLAHE_TILES,
            clahe_clip_limit: CLAHE_CLIP_LIMIT,
            blur_sigma: BLUR_SIGMA,
            opening_radius: OPENING_RADIUS,
            min_area: MIN_AREA,
            max_area: MAX_AREA,
            threshold_mode: ThresholdMode::default(),
            style: DrawStyle::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_width == 0 {
            return Err(field("max_width", "must be positive"));
        }
        if self.clahe_tiles == 0 {
            return Err(field("clahe_tiles", "must be positive"));
        }
        if !(self.clahe_clip_limit >= 0.0) {
            return Err(field("clahe_clip_limit", "must be zero or positive"));
        }
        if !(self.blur_sigma > 0.0) {
            return Err(field("blur_sigma", "must be positive"));
        }
        if !(self.min_area >= 0.0 && self.min_area < self.max_area) {
            return Err(field("min_area", "must be non-negative and below max_area"));
        }
        if self.style.digit_scale == 0 {
            return Err(field("style.digit_scale", "must be positive"));
        }
        Ok(())
    }
}

fn field(field: &'static str, reason: &str) -> ConfigurationError {
    ConfigurationError::Field {
        field,
        reason: reason.to_string(),
    }
}

/// Colours and sizes used when rendering the visualizations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawStyle {
    pub grid_color: [u8; 3],
    pub count_color: [u8; 3],
    pub marker_color: [u8; 3],
    /// Radius of the circle drawn around each colony on the overview.
    pub marker_radius: i32,
    /// Radius of the filled dot drawn on sector crops.
    pub sector_marker_radius: i32,
    pub digit_scale: u32,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            grid_color: GRID_COLOR,
            count_color: COUNT_COLOR,
            marker_color: MARKER_COLOR,
            marker_radius: MARKER_RADIUS,
            sector_marker_radius: SECTOR_MARKER_RADIUS,
            digit_scale: DIGIT_SCALE,
        }
    }
}

impl DrawStyle {
    pub fn grid(&self) -> Rgb<u8> {
        Rgb(self.grid_color)
    }

    pub fn count(&self) -> Rgb<u8> {
        Rgb(self.count_color)
    }

    pub fn marker(&self) -> Rgb<u8> {
        Rgb(self.marker_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_parameters() {
        assert_eq!(
            DetectionParameters::new(0, 50),
            Err(ConfigurationError::SectorCount(0))
        );
        assert_eq!(
            DetectionParameters::new(-3, 50),
            Err(ConfigurationError::SectorCount(-3))
        );
        assert_eq!(
            DetectionParameters::new(4, 101),
            Err(ConfigurationError::Sensitivity(101))
        );
        assert_eq!(
            DetectionParameters::new(4, -1),
            Err(ConfigurationError::Sensitivity(-1))
        );
        let p = DetectionParameters::new(9, 100).expect("valid");
        assert_eq!((p.sector_count(), p.sensitivity()), (9, 100));
    }

    #[test]
    fn parameters_deserialize_with_defaults_and_validation() {
        let p: DetectionParameters = serde_json::from_str("{}").expect("defaults");
        assert_eq!(p, DetectionParameters::default());

        let p: DetectionParameters =
            serde_json::from_str(r#"{"sectors": 6, "sensitivity": 20}"#).expect("valid");
        assert_eq!((p.sector_count(), p.sensitivity()), (6, 20));

        let err = serde_json::from_str::<DetectionParameters>(r#"{"sectors": 0}"#);
        assert!(err.is_err());
    }

    #[test]
    fn partial_config_overrides_only_named_fields() {
        let cfg: AnalysisConfig =
            serde_json::from_str(r#"{"max_area": 500.0, "threshold_mode": "otsu"}"#)
                .expect("parse");
        assert_eq!(cfg.max_area, 500.0);
        assert_eq!(cfg.threshold_mode, ThresholdMode::Otsu);
        assert_eq!(cfg.max_width, 800);
        assert_eq!(cfg.style, DrawStyle::default());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unusable_config() {
        let cfg = AnalysisConfig {
            blur_sigma: 0.0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigurationError::Field { field: "blur_sigma", .. })
        ));

        let cfg = AnalysisConfig {
            min_area: 10.0,
            max_area: 10.0,
            ..AnalysisConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
