// ============================================================================
// EDGES — Sobel gradients + Canny two-threshold edge detector
// ============================================================================

use image::GrayImage;
use rayon::prelude::*;

// tan(22.5°) in Q15, used to bucket gradient directions without atan2.
const TG22: i64 = 13573;

/// 3×3 Sobel derivatives with replicated borders.
/// Returns `(dx, dy)` as row-major `i32` buffers.
pub fn sobel_3x3(src: &GrayImage) -> (Vec<i32>, Vec<i32>) {
    let (w, h) = (src.width() as usize, src.height() as usize);
    let mut gx = vec![0i32; w * h];
    let mut gy = vec![0i32; w * h];
    if w == 0 || h == 0 {
        return (gx, gy);
    }
    let raw = src.as_raw();
    let px = |x: isize, y: isize| -> i32 {
        let cx = x.clamp(0, w as isize - 1) as usize;
        let cy = y.clamp(0, h as isize - 1) as usize;
        raw[cy * w + cx] as i32
    };

    gx.par_chunks_mut(w)
        .zip(gy.par_chunks_mut(w))
        .enumerate()
        .for_each(|(y, (row_x, row_y))| {
            let y = y as isize;
            for x in 0..w {
                let xi = x as isize;
                let tl = px(xi - 1, y - 1);
                let tc = px(xi, y - 1);
                let tr = px(xi + 1, y - 1);
                let ml = px(xi - 1, y);
                let mr = px(xi + 1, y);
                let bl = px(xi - 1, y + 1);
                let bc = px(xi, y + 1);
                let br = px(xi + 1, y + 1);
                row_x[x] = (tr + 2 * mr + br) - (tl + 2 * ml + bl);
                row_y[x] = (bl + 2 * bc + br) - (tl + 2 * tc + tr);
            }
        });

    (gx, gy)
}

/// Canny edge detector.
///
/// Gradient magnitude is `|dx| + |dy|` of a 3×3 Sobel. A pixel survives
/// non-maximum suppression when it beats its neighbours across the gradient
/// direction; survivors above `high` seed edges, survivors above `low` are
/// kept only when 8-connected to a seed. Thresholds are swapped if given in
/// the wrong order. The input is not smoothed here.
///
/// Output is a binary map: 255 on edges, 0 elsewhere.
pub fn canny(src: &GrayImage, low: u8, high: u8) -> GrayImage {
    let (low, high) = if low > high { (high, low) } else { (low, high) };
    let (w, h) = (src.width() as usize, src.height() as usize);
    if w == 0 || h == 0 {
        return GrayImage::new(src.width(), src.height());
    }

    let (gx, gy) = sobel_3x3(src);
    let mag: Vec<i32> = gx.iter().zip(&gy).map(|(a, b)| a.abs() + b.abs()).collect();
    let state = suppress_non_maxima(w, h, &gx, &gy, &mag, low as i32, high as i32);
    hysteresis(w, h, state)
}

const NONE: u8 = 0;
const WEAK: u8 = 1;
const STRONG: u8 = 2;

/// Classify each pixel as none / weak candidate / strong seed.
fn suppress_non_maxima(
    w: usize,
    h: usize,
    gx: &[i32],
    gy: &[i32],
    mag: &[i32],
    low: i32,
    high: i32,
) -> Vec<u8> {
    // Magnitude outside the image counts as zero.
    let at = |x: isize, y: isize| -> i32 {
        if x < 0 || y < 0 || x >= w as isize || y >= h as isize {
            0
        } else {
            mag[y as usize * w + x as usize]
        }
    };

    let mut state = vec![NONE; w * h];
    state.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        let yi = y as isize;
        for (x, cell) in row.iter_mut().enumerate() {
            let idx = y * w + x;
            let m = mag[idx];
            if m <= low {
                continue;
            }
            let xi = x as isize;
            let xs = gx[idx] as i64;
            let ys = gy[idx] as i64;
            let ax = xs.abs();
            let ay = ys.abs() << 15;
            let tg22x = ax * TG22;

            let is_max = if ay < tg22x {
                // Mostly horizontal gradient: compare left / right.
                m > at(xi - 1, yi) && m >= at(xi + 1, yi)
            } else {
                let tg67x = tg22x + (ax << 16);
                if ay > tg67x {
                    // Mostly vertical gradient: compare up / down.
                    m > at(xi, yi - 1) && m >= at(xi, yi + 1)
                } else {
                    let s: isize = if (xs < 0) != (ys < 0) { -1 } else { 1 };
                    m > at(xi - s, yi - 1) && m > at(xi + s, yi + 1)
                }
            };

            if is_max {
                *cell = if m > high { STRONG } else { WEAK };
            }
        }
    });
    state
}

/// Promote weak pixels connected to strong ones, drop the rest.
fn hysteresis(w: usize, h: usize, mut state: Vec<u8>) -> GrayImage {
    let mut stack: Vec<(usize, usize)> = state
        .iter()
        .enumerate()
        .filter(|(_, s)| **s == STRONG)
        .map(|(i, _)| (i % w, i / w))
        .collect();

    while let Some((x, y)) = stack.pop() {
        let y0 = y.saturating_sub(1);
        let y1 = (y + 1).min(h - 1);
        let x0 = x.saturating_sub(1);
        let x1 = (x + 1).min(w - 1);
        for ny in y0..=y1 {
            for nx in x0..=x1 {
                let nidx = ny * w + nx;
                if state[nidx] == WEAK {
                    state[nidx] = STRONG;
                    stack.push((nx, ny));
                }
            }
        }
    }

    let raw: Vec<u8> = state
        .par_iter()
        .map(|&s| if s == STRONG { 255 } else { 0 })
        .collect();
    GrayImage::from_raw(w as u32, h as u32, raw).unwrap_or_else(|| GrayImage::new(w as u32, h as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn vertical_step(w: u32, h: u32, at: u32, lo: u8, hi: u8) -> GrayImage {
        GrayImage::from_fn(w, h, |x, _| Luma([if x < at { lo } else { hi }]))
    }

    #[test]
    fn sobel_of_constant_image_is_zero() {
        let img = GrayImage::from_pixel(6, 6, Luma([90]));
        let (gx, gy) = sobel_3x3(&img);
        assert!(gx.iter().chain(&gy).all(|&v| v == 0));
    }

    #[test]
    fn sobel_responds_to_vertical_step() {
        let (gx, gy) = sobel_3x3(&vertical_step(8, 4, 4, 0, 100));
        assert_eq!(gx[4 + 8], 400);
        assert_eq!(gx[3 + 8], 400);
        assert_eq!(gx[8], 0);
        assert!(gy.iter().all(|&v| v == 0));
    }

    #[test]
    fn flat_image_has_no_edges() {
        let img = GrayImage::from_pixel(20, 20, Luma([128]));
        let edges = canny(&img, 0, 0);
        assert!(edges.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn step_edge_is_one_pixel_wide() {
        let img = vertical_step(20, 12, 10, 0, 200);
        let edges = canny(&img, 50, 150);
        for y in 0..12 {
            for x in 0..20 {
                let expected = if x == 9 { 255 } else { 0 };
                assert_eq!(edges.get_pixel(x, y)[0], expected, "({x},{y})");
            }
        }
    }

    #[test]
    fn high_threshold_above_gradient_suppresses_everything() {
        let img = vertical_step(20, 12, 10, 100, 110);
        // Magnitude is 40 along the step.
        assert!(canny(&img, 10, 60).pixels().all(|p| p[0] == 0));
        assert!(canny(&img, 10, 30).pixels().any(|p| p[0] == 255));
    }

    #[test]
    fn swapped_thresholds_behave_like_ordered_ones() {
        let img = vertical_step(16, 16, 8, 0, 255);
        assert_eq!(canny(&img, 150, 50), canny(&img, 50, 150));
    }

    #[test]
    fn two_row_image_still_finds_step() {
        let img = vertical_step(10, 2, 5, 0, 255);
        let edges = canny(&img, 50, 150);
        for y in 0..2 {
            for x in 0..10 {
                let expected = if x == 4 { 255 } else { 0 };
                assert_eq!(edges.get_pixel(x, y)[0], expected, "({x},{y})");
            }
        }
    }

    #[test]
    fn single_pixel_and_flat_thin_images_are_empty() {
        let out = canny(&GrayImage::from_pixel(1, 1, Luma([255])), 10, 20);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        let out = canny(&GrayImage::from_pixel(2, 5, Luma([255])), 10, 20);
        assert_eq!(out.dimensions(), (2, 5));
        assert!(out.pixels().all(|p| p[0] == 0));
    }
}
