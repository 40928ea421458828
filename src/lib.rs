//! Colony counting for culture-plate photos.
//!
//! The pipeline decodes an image, normalizes and enhances it, segments dark
//! blobs, counts their centroids over a sector grid and renders an annotated
//! overview plus one crop per sector. Everything runs in memory on the
//! calling thread; see [`pipeline::Analyzer`].

pub mod error;
pub mod params;
pub mod pipeline;
pub mod result;
pub mod sector_grid;
pub mod synthetic;
pub mod visualize;

pub use error::{AnalysisError, ConfigurationError, DecodeError, InternalComputationError};
pub use params::{AnalysisConfig, DetectionParameters, ThresholdMode};
pub use pipeline::{Analyzer, analyze};
pub use result::{AnalysisResult, GridShape, Point, SectorResult, SectorStats};
