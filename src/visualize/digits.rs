//! Minimal 3x5 bitmap font for rendering counts without a font file.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

const GLYPH_WIDTH: u32 = 3;
const GLYPH_HEIGHT: u32 = 5;

// One row per entry, most significant of the low three bits is the left column.
const GLYPHS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Pixel size of `value` rendered at `scale`.
pub fn text_size(value: usize, scale: u32) -> (u32, u32) {
    let scale = scale.max(1);
    let digits = value.to_string().len() as u32;
    let advance = (GLYPH_WIDTH + 1) * scale;
    (digits * advance - scale, GLYPH_HEIGHT * scale)
}

/// Draws the decimal digits of `value` with the top-left corner at `(x, y)`.
/// Parts falling outside the canvas are clipped.
pub fn draw_number(canvas: &mut RgbImage, x: i32, y: i32, value: usize, scale: u32, color: Rgb<u8>) {
    let scale = scale.max(1);
    let advance = ((GLYPH_WIDTH + 1) * scale) as i32;
    for (i, ch) in value.to_string().chars().enumerate() {
        let Some(d) = ch.to_digit(10) else {
            continue;
        };
        let origin_x = x + i as i32 * advance;
        for (row, bits) in GLYPHS[d as usize].iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let px = origin_x + (col * scale) as i32;
                let py = y + (row as u32 * scale) as i32;
                draw_filled_rect_mut(canvas, Rect::at(px, py).of_size(scale, scale), color);
            }
        }
    }
}
