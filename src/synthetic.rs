//! Synthetic plate images for demos and tests.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// A square colony to paint on a synthetic plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colony {
    /// Top-left corner.
    pub x: u32,
    pub y: u32,
    pub size: u32,
    /// Gray level of the colony, 0 is black.
    pub intensity: u8,
}

impl Colony {
    pub fn black(x: u32, y: u32, size: u32) -> Self {
        Self {
            x,
            y,
            size,
            intensity: 0,
        }
    }
}

/// White plate of the given size with each colony painted as a filled square.
/// Squares are clipped to the image.
pub fn plate(width: u32, height: u32, colonies: &[Colony]) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    for c in colonies {
        let v = c.intensity;
        for y in c.y..(c.y + c.size).min(height) {
            for x in c.x..(c.x + c.size).min(width) {
                img.put_pixel(x, y, Rgb([v, v, v]));
            }
        }
    }
    img
}

/// `count_x` by `count_y` colonies of one size spread evenly over the plate.
pub fn evenly_spaced(
    width: u32,
    height: u32,
    count_x: u32,
    count_y: u32,
    size: u32,
    intensity: u8,
) -> Vec<Colony> {
    let mut out = Vec::with_capacity((count_x * count_y) as usize);
    for j in 0..count_y {
        for i in 0..count_x {
            let cx = width * (2 * i + 1) / (2 * count_x);
            let cy = height * (2 * j + 1) / (2 * count_y);
            out.push(Colony {
                x: cx.saturating_sub(size / 2),
                y: cy.saturating_sub(size / 2),
                size,
                intensity,
            });
        }
    }
    out
}

pub fn png_bytes(img: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img.clone()).write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colonies_are_painted_and_clipped() {
        let img = plate(20, 20, &[Colony::black(2, 2, 3), Colony::black(18, 18, 5)]);
        assert_eq!(img.get_pixel(3, 3), &Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(5, 5), &Rgb([255, 255, 255]));
        assert_eq!(img.get_pixel(19, 19), &Rgb([0, 0, 0]));
    }

    #[test]
    fn even_spacing_centres_colonies() {
        let colonies = evenly_spaced(200, 100, 2, 1, 10, 0);
        assert_eq!(
            colonies,
            vec![
                Colony::black(45, 45, 10),
                Colony::black(145, 45, 10),
            ]
        );
    }
}
