//! Partition of the analysed image into sectors and per-sector tallies.

use tracing::warn;

use crate::result::{GridShape, Point};

/// Half-open pixel bounds `[x0, x1) x [y0, y1)` of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellBounds {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CellBounds {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn contains(&self, p: Point) -> bool {
        self.x0 <= p.x && p.x < self.x1 && self.y0 <= p.y && p.y < self.y1
    }

    /// Cell-relative coordinate of a contained point.
    pub fn local(&self, p: Point) -> Point {
        Point::new(p.x - self.x0, p.y - self.y0)
    }
}

/// Sector layout over an image of known size.
///
/// Rows share the image height evenly with the last row taking the
/// remainder. Every row but the last holds `cols` cells; the last row holds
/// whatever is left of `sector_count` and stretches those cells across the
/// full width, so the used cells always cover the whole image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorGrid {
    shape: GridShape,
    sector_count: u32,
    width: u32,
    height: u32,
}

impl SectorGrid {
    pub fn new(sector_count: u32, width: u32, height: u32) -> Self {
        let sector_count = sector_count.max(1);
        Self {
            shape: GridShape::for_sector_count(sector_count),
            sector_count,
            width,
            height,
        }
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn sector_count(&self) -> u32 {
        self.sector_count
    }

    fn cells_in_row(&self, row: u32) -> u32 {
        if row + 1 == self.shape.rows {
            self.sector_count - row * self.shape.cols
        } else {
            self.shape.cols
        }
    }

    /// Bounds of the cell at row-major `index`, for `index < sector_count`.
    pub fn cell_bounds(&self, index: u32) -> CellBounds {
        let rows = self.shape.rows;
        let row = index / self.shape.cols;
        let col = index % self.shape.cols;

        let cell_h = self.height / rows;
        let y0 = row * cell_h;
        let y1 = if row + 1 == rows { self.height } else { y0 + cell_h };

        let in_row = self.cells_in_row(row);
        let cell_w = self.width / in_row;
        let x0 = col * cell_w;
        let x1 = if col + 1 == in_row { self.width } else { x0 + cell_w };

        CellBounds { x0, y0, x1, y1 }
    }

    /// Non-empty cells in row-major order, paired with their index.
    ///
    /// Only rows and columns that can hold pixels are walked, so the work
    /// is bounded by the image area however large `sector_count` is.
    pub fn cells(&self) -> Vec<(usize, CellBounds)> {
        let GridShape { rows, cols } = self.shape;
        let area = u64::from(self.width) * u64::from(self.height);
        let capacity = u64::from(self.sector_count).min(area) as usize;
        let mut out = Vec::with_capacity(capacity);

        // With fewer pixel rows than grid rows only the last row has height.
        let first_row = if self.height / rows == 0 { rows - 1 } else { 0 };
        for row in first_row..rows {
            let in_row = self.cells_in_row(row);
            let first_col = if self.width / in_row == 0 { in_row - 1 } else { 0 };
            for col in first_col..in_row {
                let index = row * cols + col;
                let bounds = self.cell_bounds(index);
                if bounds.is_empty() {
                    continue;
                }
                out.push((index as usize, bounds));
            }
        }

        if out.len() < self.sector_count as usize {
            warn!(
                sectors = self.sector_count,
                valid = out.len(),
                width = self.width,
                height = self.height,
                "sector grid has empty cells"
            );
        }
        out
    }
}

/// Number of points falling inside one sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorTally {
    pub index: usize,
    pub bounds: CellBounds,
    pub count: usize,
}

/// Counts points per non-empty cell, in row-major order.
pub fn tally(grid: &SectorGrid, points: &[Point]) -> Vec<SectorTally> {
    grid.cells()
        .into_iter()
        .map(|(index, bounds)| SectorTally {
            index,
            bounds,
            count: points.iter().filter(|&&p| bounds.contains(p)).count(),
        })
        .collect()
}
