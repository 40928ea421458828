//! Contrast-limited adaptive histogram equalization.
//!
//! The image is split into a `tiles x tiles` grid. Each tile gets its own
//! equalization lookup table built from a clipped histogram, and every pixel
//! is mapped by bilinearly blending the tables of the four nearest tile
//! centres. Clipping caps how steep a table can get, so near-uniform tiles
//! are not stretched into noise.

use image::GrayImage;

type Lut = [u8; 256];

pub fn equalize_local(gray: &GrayImage, tiles: u32, clip_limit: f32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let w = width as usize;
    let h = height as usize;
    if w == 0 || h == 0 {
        return gray.clone();
    }

    let tiles_x = tiles.clamp(1, width) as usize;
    let tiles_y = tiles.clamp(1, height) as usize;
    let x_edges = tile_edges(w, tiles_x);
    let y_edges = tile_edges(h, tiles_y);
    let src = gray.as_raw();

    let mut luts: Vec<Lut> = Vec::with_capacity(tiles_x * tiles_y);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut histogram = [0u32; 256];
            for y in y_edges[ty]..y_edges[ty + 1] {
                let row = &src[y * w + x_edges[tx]..y * w + x_edges[tx + 1]];
                for &value in row {
                    histogram[value as usize] += 1;
                }
            }
            let area = ((x_edges[tx + 1] - x_edges[tx]) * (y_edges[ty + 1] - y_edges[ty])) as u32;
            clip_histogram(&mut histogram, area, clip_limit);
            luts.push(cumulative_lut(&histogram, area));
        }
    }

    let x_centers = tile_centers(&x_edges);
    let y_centers = tile_centers(&y_edges);
    let x_weights: Vec<(usize, usize, f32)> =
        (0..w).map(|x| neighbours(&x_centers, x as f32)).collect();

    let mut out = vec![0u8; w * h];
    for y in 0..h {
        let (ty0, ty1, fy) = neighbours(&y_centers, y as f32);
        for x in 0..w {
            let (tx0, tx1, fx) = x_weights[x];
            let v = src[y * w + x] as usize;
            let top = lerp(
                luts[ty0 * tiles_x + tx0][v],
                luts[ty0 * tiles_x + tx1][v],
                fx,
            );
            let bottom = lerp(
                luts[ty1 * tiles_x + tx0][v],
                luts[ty1 * tiles_x + tx1][v],
                fx,
            );
            let blended = top + (bottom - top) * fy;
            out[y * w + x] = blended.round().clamp(0.0, 255.0) as u8;
        }
    }

    // Same dimensions as the input, so the buffer always fits.
    GrayImage::from_raw(width, height, out).unwrap_or_else(|| gray.clone())
}

/// `count + 1` boundaries splitting `len` into near-equal non-empty spans.
fn tile_edges(len: usize, count: usize) -> Vec<usize> {
    (0..=count).map(|i| i * len / count).collect()
}

fn tile_centers(edges: &[usize]) -> Vec<f32> {
    edges
        .windows(2)
        .map(|span| (span[0] + span[1]) as f32 / 2.0 - 0.5)
        .collect()
}

/// The two tiles whose centres bracket `p` and the blend weight of the second.
fn neighbours(centers: &[f32], p: f32) -> (usize, usize, f32) {
    let last = centers.len() - 1;
    if p <= centers[0] {
        return (0, 0, 0.0);
    }
    if p >= centers[last] {
        return (last, last, 0.0);
    }
    let i = centers.iter().rposition(|&c| c <= p).unwrap_or(0).min(last - 1);
    let t = (p - centers[i]) / (centers[i + 1] - centers[i]);
    (i, i + 1, t)
}

fn lerp(a: u8, b: u8, t: f32) -> f32 {
    a as f32 + (b as f32 - a as f32) * t
}

/// Caps each bin and spreads the excess evenly over the whole histogram.
fn clip_histogram(histogram: &mut [u32; 256], area: u32, clip_limit: f32) {
    if clip_limit <= 0.0 {
        return;
    }
    let limit = ((clip_limit * area as f32 / 256.0) as u32).max(1);
    let mut excess = 0u32;
    for bin in histogram.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }

    let batch = excess / 256;
    let residual = (excess % 256) as usize;
    for bin in histogram.iter_mut() {
        *bin += batch;
    }
    if residual > 0 {
        let step = (256 / residual).max(1);
        for bin in histogram.iter_mut().step_by(step).take(residual) {
            *bin += 1;
        }
    }
}

fn cumulative_lut(histogram: &[u32; 256], area: u32) -> Lut {
    let scale = 255.0 / area.max(1) as f32;
    let mut lut = [0u8; 256];
    let mut sum = 0u32;
    for (value, &count) in histogram.iter().enumerate() {
        sum += count;
        lut[value] = (sum as f32 * scale).round().min(255.0) as u8;
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn histogram_mass_survives_clipping() {
        let mut histogram = [0u32; 256];
        histogram[0] = 100;
        histogram[255] = 525;
        clip_histogram(&mut histogram, 625, 2.0);
        assert_eq!(histogram.iter().sum::<u32>(), 625);
        assert!(histogram.iter().all(|&c| c <= 4 + 3));
    }

    #[test]
    fn brightest_value_maps_to_white() {
        let img = GrayImage::from_pixel(64, 48, Luma([255]));
        let out = equalize_local(&img, 8, 2.0);
        assert!(out.pixels().all(|p| *p == Luma([255])));
    }

    #[test]
    fn mapping_preserves_order_within_a_tile() {
        let img = GrayImage::from_fn(16, 16, |x, y| Luma([((x + y * 16) % 256) as u8]));
        let out = equalize_local(&img, 1, 2.0);
        let src = img.as_raw();
        let dst = out.as_raw();
        for i in 0..src.len() {
            for j in 0..src.len() {
                if src[i] < src[j] {
                    assert!(dst[i] <= dst[j]);
                }
            }
        }
    }

    #[test]
    fn dark_blobs_stay_dark_on_light_background() {
        let img = GrayImage::from_fn(200, 200, |x, y| {
            if (90..100).contains(&x) && (90..100).contains(&y) {
                Luma([0])
            } else {
                Luma([255])
            }
        });
        let out = equalize_local(&img, 8, 2.0);
        assert!(out.get_pixel(95, 95)[0] < 20);
        assert_eq!(out.get_pixel(10, 10)[0], 255);
    }

    #[test]
    fn tiny_images_use_fewer_tiles() {
        let img = GrayImage::from_fn(3, 2, |x, _| Luma([(x * 100) as u8]));
        let out = equalize_local(&img, 8, 2.0);
        assert_eq!(out.dimensions(), (3, 2));
    }
}
