use serde::{Serialize, Serializer};

/// Integer pixel coordinate of one detected colony centroid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Rows and columns of the sector grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridShape {
    pub rows: u32,
    pub cols: u32,
}

impl GridShape {
    /// Most nearly square layout holding `sector_count` cells.
    pub fn for_sector_count(sector_count: u32) -> Self {
        let sector_count = sector_count.max(1);
        let cols = ceil_sqrt(sector_count);
        let rows = sector_count.div_ceil(cols);
        Self { rows, cols }
    }

    /// Cells in the full rectangle; wider than `u32` for the largest counts.
    pub fn cell_count(&self) -> u64 {
        u64::from(self.rows) * u64::from(self.cols)
    }
}

fn ceil_sqrt(n: u32) -> u32 {
    let n = u64::from(n);
    let mut root = (n as f64).sqrt().ceil() as u64;
    while root * root < n {
        root += 1;
    }
    while root > 1 && (root - 1) * (root - 1) >= n {
        root -= 1;
    }
    // ceil(sqrt(u32::MAX)) is 65536
    root as u32
}

/// Count and rendered crop of one sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorResult {
    /// Row-major cell index, zero based. Serialized one based as `sector`.
    #[serde(rename = "sector", serialize_with = "one_based")]
    pub index: usize,
    pub count: usize,
    /// Base64 PNG of the cropped sector with colony markers.
    #[serde(rename = "image")]
    pub cropped_visualization: String,
}

fn one_based<S: Serializer>(index: &usize, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(*index as u64 + 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectorStats {
    pub mean: f64,
    pub max: usize,
    pub min: usize,
}

impl SectorStats {
    /// Mean, max and min over per-sector counts; all zero for no sectors.
    pub fn from_counts(counts: &[usize]) -> Self {
        let (Some(&max), Some(&min)) = (counts.iter().max(), counts.iter().min()) else {
            return Self {
                mean: 0.0,
                max: 0,
                min: 0,
            };
        };
        let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
        Self { mean, max, min }
    }
}

/// Complete outcome of one analysis.
///
/// Serializes to `{total, processedImage, sectors, stats, grid}`; the point
/// list and analysed dimensions are only available to Rust callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    #[serde(rename = "total")]
    pub total_count: usize,
    #[serde(rename = "processedImage")]
    pub overview_visualization: String,
    #[serde(rename = "sectors")]
    pub sector_results: Vec<SectorResult>,
    pub stats: SectorStats,
    #[serde(rename = "grid")]
    pub grid_shape: GridShape,
    #[serde(skip)]
    pub points: Vec<Point>,
    #[serde(skip)]
    pub width: u32,
    #[serde(skip)]
    pub height: u32,
}

impl AnalysisResult {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_shape_is_minimal_and_near_square() {
        for n in 1..=400u32 {
            let g = GridShape::for_sector_count(n);
            assert!(g.cell_count() >= u64::from(n), "n={n} {g:?}");
            assert!(g.cell_count() - u64::from(n) < u64::from(g.cols), "n={n} {g:?}");
            assert!(g.rows <= g.cols, "n={n} {g:?}");
        }
        assert_eq!(GridShape::for_sector_count(1), GridShape { rows: 1, cols: 1 });
        assert_eq!(GridShape::for_sector_count(4), GridShape { rows: 2, cols: 2 });
        assert_eq!(GridShape::for_sector_count(5), GridShape { rows: 2, cols: 3 });
        assert_eq!(GridShape::for_sector_count(10), GridShape { rows: 3, cols: 4 });
    }

    #[test]
    fn grid_shape_handles_largest_counts() {
        for n in [65_535 * 65_535, 65_535 * 65_535 + 1, 4_294_900_000, u32::MAX] {
            let g = GridShape::for_sector_count(n);
            assert!(g.cell_count() >= u64::from(n), "n={n} {g:?}");
            assert!(g.cell_count() - u64::from(n) < u64::from(g.cols), "n={n} {g:?}");
        }
        assert_eq!(
            GridShape::for_sector_count(u32::MAX),
            GridShape { rows: 65_536, cols: 65_536 }
        );
    }

    #[test]
    fn stats_over_counts() {
        let s = SectorStats::from_counts(&[1, 4, 1, 2]);
        assert_eq!(s.max, 4);
        assert_eq!(s.min, 1);
        assert!((s.mean - 2.0).abs() < 1e-12);

        let empty = SectorStats::from_counts(&[]);
        assert_eq!(
            empty,
            SectorStats {
                mean: 0.0,
                max: 0,
                min: 0
            }
        );
    }

    #[test]
    fn sector_serializes_one_based() {
        let s = SectorResult {
            index: 0,
            count: 3,
            cropped_visualization: "abc".into(),
        };
        let v = serde_json::to_value(&s).expect("serialize");
        assert_eq!(v, serde_json::json!({"sector": 1, "count": 3, "image": "abc"}));
    }
}
