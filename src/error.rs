use kornia::image::ImageError;

/// Errors raised while turning raw bytes into a pixel grid.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("image payload is empty")]
    Empty,

    #[error("unsupported or corrupt image: {0}")]
    Format(#[from] image::ImageError),

    #[error("image has zero size ({width}x{height})")]
    ZeroSized { width: u32, height: u32 },
}

/// Invalid call parameters or tunables, rejected before any processing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("sector count must be at least 1, got {0}")]
    SectorCount(i64),

    #[error("sensitivity must be within 0..=100, got {0}")]
    Sensitivity(i64),

    #[error("invalid config field `{field}`: {reason}")]
    Field {
        field: &'static str,
        reason: String,
    },
}

/// Unexpected failures inside the pipeline itself.
#[derive(Debug, thiserror::Error)]
pub enum InternalComputationError {
    #[error("kornia image error: {0}")]
    Kornia(#[from] ImageError),

    #[error("buffer of {len} bytes does not fit a {width}x{height} image")]
    BufferShape { width: u32, height: u32, len: usize },

    #[error("contour produced a non-finite centroid ({x}, {y})")]
    NonFiniteCentroid { x: f64, y: f64 },

    #[error("failed to encode visualization: {0}")]
    Encode(#[source] image::ImageError),
}

/// The single failure surfaced to callers of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("internal computation error: {0}")]
    Internal(#[from] InternalComputationError),
}

impl From<ImageError> for AnalysisError {
    fn from(err: ImageError) -> Self {
        AnalysisError::Internal(err.into())
    }
}
