//! Overview and per-sector renderings for human verification.

pub mod digits;

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbImage, imageops};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::error::InternalComputationError;
use crate::params::DrawStyle;
use crate::result::Point;
use crate::sector_grid::{CellBounds, SectorTally};

use self::digits::{draw_number, text_size};

const LABEL_OFFSET: i32 = 5;

/// Rendered rasters, before transport encoding.
#[derive(Debug, Clone)]
pub struct Visualization {
    pub overview: RgbImage,
    /// One crop per tally, in the same order.
    pub sectors: Vec<RgbImage>,
}

/// Base64 PNG form of a [`Visualization`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedVisualization {
    pub overview: String,
    pub sectors: Vec<String>,
}

impl Visualization {
    pub fn encode(&self) -> Result<EncodedVisualization, InternalComputationError> {
        Ok(EncodedVisualization {
            overview: encode_png_base64(&self.overview)?,
            sectors: self
                .sectors
                .iter()
                .map(encode_png_base64)
                .collect::<Result<_, _>>()?,
        })
    }
}

pub fn visualize(
    color: &RgbImage,
    tallies: &[SectorTally],
    points: &[Point],
    style: &DrawStyle,
) -> Visualization {
    Visualization {
        overview: render_overview(color, tallies, points, style),
        sectors: tallies
            .iter()
            .map(|t| render_sector(color, t, points, style))
            .collect(),
    }
}

/// Copy of the image with every sector outlined, its count written near
/// the top-left corner and each colony circled.
pub fn render_overview(
    color: &RgbImage,
    tallies: &[SectorTally],
    points: &[Point],
    style: &DrawStyle,
) -> RgbImage {
    let mut canvas = color.clone();

    for p in points {
        let center = (p.x as i32, p.y as i32);
        draw_hollow_circle_mut(&mut canvas, center, style.marker_radius, style.marker());
        if style.marker_radius > 1 {
            draw_hollow_circle_mut(&mut canvas, center, style.marker_radius - 1, style.marker());
        }
    }

    for t in tallies {
        let b = t.bounds;
        let rect = Rect::at(b.x0 as i32, b.y0 as i32).of_size(b.width(), b.height());
        draw_hollow_rect_mut(&mut canvas, rect, style.grid());
        let (x, y) = label_origin(&b, t.count, style.digit_scale);
        draw_number(&mut canvas, x, y, t.count, style.digit_scale, style.count());
    }

    canvas
}

/// Top-left corner for a sector's count label: inset from the cell corner,
/// pulled back toward the corner when the label would cross the far edge.
fn label_origin(bounds: &CellBounds, count: usize, scale: u32) -> (i32, i32) {
    let (text_w, text_h) = text_size(count, scale);
    let slack_x = (bounds.width() as i64 - text_w as i64).max(0);
    let slack_y = (bounds.height() as i64 - text_h as i64).max(0);
    (
        bounds.x0 as i32 + LABEL_OFFSET.min(slack_x as i32),
        bounds.y0 as i32 + LABEL_OFFSET.min(slack_y as i32),
    )
}

/// The sector's crop with a dot on each colony it contains.
pub fn render_sector(
    color: &RgbImage,
    tally: &SectorTally,
    points: &[Point],
    style: &DrawStyle,
) -> RgbImage {
    let b = tally.bounds;
    let mut crop = imageops::crop_imm(color, b.x0, b.y0, b.width(), b.height()).to_image();
    for &p in points.iter().filter(|&&p| b.contains(p)) {
        let local = b.local(p);
        draw_filled_circle_mut(
            &mut crop,
            (local.x as i32, local.y as i32),
            style.sector_marker_radius,
            style.marker(),
        );
    }
    crop
}

pub fn encode_png_base64(img: &RgbImage) -> Result<String, InternalComputationError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(InternalComputationError::Encode)?;
    Ok(STANDARD.encode(&buf))
}
