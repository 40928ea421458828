//! The five analysis stages and their composition.
//!
//! Stages run strictly in order on buffers owned by the call:
//! [`decode`] → [`preprocess`] → [`segment`] → [`detect`] plus
//! [`crate::sector_grid`] → [`crate::visualize`].

pub mod decode;
pub mod detect;
pub mod equalize;
pub(crate) mod kornia_io;
pub mod preprocess;
pub mod segment;

use tracing::info;

use self::detect::{ContourExtractor, ImageprocContours, MomentComputer, PolygonMoments};
use crate::error::AnalysisError;
use crate::params::{AnalysisConfig, DetectionParameters};
use crate::result::{AnalysisResult, SectorResult, SectorStats};
use crate::sector_grid::{SectorGrid, tally};
use crate::visualize::visualize;

/// Runs the pipeline with default tunables.
pub fn analyze(
    bytes: &[u8],
    params: &DetectionParameters,
) -> Result<AnalysisResult, AnalysisError> {
    Analyzer::default().analyze(bytes, params)
}

/// Pipeline configured with tunables and contour/moment back-ends.
///
/// Holds no per-image state, so one analyzer can serve any number of calls,
/// including concurrent ones.
#[derive(Debug, Clone)]
pub struct Analyzer<C = ImageprocContours, M = PolygonMoments> {
    config: AnalysisConfig,
    contours: C,
    moments: M,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self::with_backends(config, ImageprocContours, PolygonMoments)
    }
}

impl<C: ContourExtractor, M: MomentComputer> Analyzer<C, M> {
    pub fn with_backends(config: AnalysisConfig, contours: C, moments: M) -> Self {
        Self {
            config,
            contours,
            moments,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyses one encoded image. Either the full result is produced or the
    /// call fails; nothing partial is returned.
    pub fn analyze(
        &self,
        bytes: &[u8],
        params: &DetectionParameters,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.config.validate()?;

        let color = decode::decode(bytes)?;
        let prepared = preprocess::preprocess(color, &self.config)?;
        let mask = segment::segment(&prepared.intensity, params.sensitivity(), &self.config)?;
        let points =
            detect::detect_points(&mask, &self.config, &self.contours, &self.moments)?;

        let (width, height) = prepared.color.dimensions();
        let grid = SectorGrid::new(params.sector_count(), width, height);
        let tallies = tally(&grid, &points);
        let counts: Vec<usize> = tallies.iter().map(|t| t.count).collect();
        let stats = SectorStats::from_counts(&counts);

        let encoded = visualize(&prepared.color, &tallies, &points, &self.config.style).encode()?;
        let sector_results = tallies
            .iter()
            .zip(encoded.sectors)
            .map(|(t, image)| SectorResult {
                index: t.index,
                count: t.count,
                cropped_visualization: image,
            })
            .collect();

        let result = AnalysisResult {
            total_count: points.len(),
            overview_visualization: encoded.overview,
            sector_results,
            stats,
            grid_shape: grid.shape(),
            points,
            width,
            height,
        };
        info!(
            total = result.total_count,
            rows = result.grid_shape.rows,
            cols = result.grid_shape.cols,
            width,
            height,
            "analysis complete"
        );
        Ok(result)
    }
}
