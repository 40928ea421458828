//! Contour extraction, area filtering and centroid computation.

use imageproc::contours::{BorderType, find_contours};
use tracing::debug;

use super::segment::BinaryMask;
use crate::error::InternalComputationError;
use crate::params::AnalysisConfig;
use crate::result::Point;

/// A closed boundary given as its ordered pixel coordinates.
pub type Contour = Vec<imageproc::point::Point<i32>>;

/// Source of outer boundaries of foreground regions.
///
/// Implementations must return only outermost boundaries: a region nested
/// inside a hole of another region is not reported, and holes themselves
/// are never reported.
pub trait ContourExtractor {
    fn external_contours(&self, mask: &BinaryMask) -> Vec<Contour>;
}

/// Zeroth and first order spatial moments of a closed contour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl SpatialMoments {
    /// `(m10 / m00, m01 / m00)`, or `None` when the contour has no area.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00 == 0.0 {
            return None;
        }
        Some((self.m10 / self.m00, self.m01 / self.m00))
    }
}

pub trait MomentComputer {
    fn moments(&self, contour: &[imageproc::point::Point<i32>]) -> SpatialMoments;

    /// Enclosed area; the zeroth moment unless overridden.
    fn area(&self, contour: &[imageproc::point::Point<i32>]) -> f64 {
        self.moments(contour).m00
    }
}

/// Border following from `imageproc`, keeping top-level outer borders.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageprocContours;

impl ContourExtractor for ImageprocContours {
    fn external_contours(&self, mask: &BinaryMask) -> Vec<Contour> {
        find_contours::<i32>(mask.as_image())
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .map(|c| c.points)
            .collect()
    }
}

/// Moments of the polygon through the contour points, via Green's theorem.
///
/// Orientation is normalised so the area is never negative. A contour that
/// encloses nothing (a single pixel or a one-pixel-wide line) has `m00 == 0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonMoments;

impl MomentComputer for PolygonMoments {
    fn moments(&self, contour: &[imageproc::point::Point<i32>]) -> SpatialMoments {
        let n = contour.len();
        if n < 3 {
            return SpatialMoments {
                m00: 0.0,
                m10: 0.0,
                m01: 0.0,
            };
        }

        let mut a00 = 0f64;
        let mut a10 = 0f64;
        let mut a01 = 0f64;
        for i in 0..n {
            let p = contour[i];
            let q = contour[(i + 1) % n];
            let (xi, yi) = (p.x as f64, p.y as f64);
            let (xj, yj) = (q.x as f64, q.y as f64);
            let cross = xi * yj - xj * yi;
            a00 += cross;
            a10 += cross * (xi + xj);
            a01 += cross * (yi + yj);
        }

        let sign = if a00 < 0.0 { -1.0 } else { 1.0 };
        SpatialMoments {
            m00: sign * a00 / 2.0,
            m10: sign * a10 / 6.0,
            m01: sign * a01 / 6.0,
        }
    }
}

/// Centroids of the contours whose area lies strictly inside
/// `(config.min_area, config.max_area)`, truncated to pixel coordinates and
/// kept inside the image.
pub fn detect_points<C, M>(
    mask: &BinaryMask,
    config: &AnalysisConfig,
    extractor: &C,
    moments: &M,
) -> Result<Vec<Point>, InternalComputationError>
where
    C: ContourExtractor + ?Sized,
    M: MomentComputer + ?Sized,
{
    let (width, height) = mask.dimensions();
    let contours = extractor.external_contours(mask);
    let mut points = Vec::new();
    let mut rejected_area = 0usize;
    let mut degenerate = 0usize;

    for contour in &contours {
        let area = moments.area(contour);
        if !(area > config.min_area && area < config.max_area) {
            rejected_area += 1;
            continue;
        }
        let Some((cx, cy)) = moments.moments(contour).centroid() else {
            degenerate += 1;
            continue;
        };
        if !cx.is_finite() || !cy.is_finite() {
            return Err(InternalComputationError::NonFiniteCentroid { x: cx, y: cy });
        }
        let x = (cx.max(0.0) as u32).min(width.saturating_sub(1));
        let y = (cy.max(0.0) as u32).min(height.saturating_sub(1));
        points.push(Point::new(x, y));
    }

    debug!(
        contours = contours.len(),
        accepted = points.len(),
        rejected_area,
        degenerate,
        "detected colonies"
    );
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use imageproc::point::Point as P;

    fn mask_from(width: u32, height: u32, on: impl Fn(u32, u32) -> bool) -> BinaryMask {
        BinaryMask::from_nonzero(GrayImage::from_fn(width, height, |x, y| {
            Luma([u8::from(on(x, y))])
        }))
    }

    #[test]
    fn square_polygon_moments() {
        let square = vec![P::new(0, 0), P::new(9, 0), P::new(9, 9), P::new(0, 9)];
        let m = PolygonMoments.moments(&square);
        assert!((m.m00 - 81.0).abs() < 1e-9);
        let (cx, cy) = m.centroid().expect("centroid");
        assert!((cx - 4.5).abs() < 1e-9 && (cy - 4.5).abs() < 1e-9);

        let mut reversed = square.clone();
        reversed.reverse();
        assert_eq!(PolygonMoments.moments(&reversed), m);
    }

    #[test]
    fn degenerate_contours_have_no_centroid() {
        let line = vec![P::new(2, 2), P::new(3, 2), P::new(4, 2), P::new(3, 2)];
        let m = PolygonMoments.moments(&line);
        assert_eq!(m.m00, 0.0);
        assert!(m.centroid().is_none());
        assert!(PolygonMoments.moments(&[P::new(1, 1)]).centroid().is_none());
    }

    #[test]
    fn nested_regions_are_not_reported() {
        // a ring with a dot inside its hole
        let mask = mask_from(40, 40, |x, y| {
            let ring = (5..35).contains(&x)
                && (5..35).contains(&y)
                && !((10..30).contains(&x) && (10..30).contains(&y));
            let dot = (18..22).contains(&x) && (18..22).contains(&y);
            ring || dot
        });
        let contours = ImageprocContours.external_contours(&mask);
        assert_eq!(contours.len(), 1);
    }

    #[test]
    fn area_filter_uses_open_interval() {
        let mask = mask_from(120, 40, |x, y| {
            let tiny = x == 5 && y == 5;
            let small = (20..26).contains(&x) && (10..16).contains(&y);
            let huge = (40..115).contains(&x) && (2..38).contains(&y);
            tiny || small || huge
        });
        let points =
            detect_points(&mask, &AnalysisConfig::default(), &ImageprocContours, &PolygonMoments)
                .expect("detect");
        assert_eq!(points, vec![Point::new(22, 12)]);
    }
}
