// ============================================================================
// IMAGE FILTERS — luma conversion, Gaussian blur
// ============================================================================

use image::{GrayImage, RgbImage};
use rayon::prelude::*;

use crate::raster::Raster;

// ---------------------------------------------------------------------------
//  Luma (BT.601)
// ---------------------------------------------------------------------------

// 14-bit fixed-point BT.601 weights: 0.299 R + 0.587 G + 0.114 B.
const LUMA_SHIFT: u32 = 14;
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;

/// Luminance of one RGB pixel, rounded to nearest.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let acc = r as u32 * LUMA_R + g as u32 * LUMA_G + b as u32 * LUMA_B + (1 << (LUMA_SHIFT - 1));
    (acc >> LUMA_SHIFT).min(255) as u8
}

/// Convert an RGB image to single-channel luminance.
pub fn rgb_to_luma(src: &RgbImage) -> GrayImage {
    let w = src.width() as usize;
    let h = src.height() as usize;
    if w == 0 || h == 0 {
        return GrayImage::new(src.width(), src.height());
    }
    let src_raw = src.as_raw();
    let mut dst_raw = vec![0u8; w * h];

    // Parallel by row.
    dst_raw.par_chunks_mut(w).enumerate().for_each(|(y, row_out)| {
        let row_in = &src_raw[y * w * 3..(y + 1) * w * 3];
        for (x, px) in row_out.iter_mut().enumerate() {
            let pi = x * 3;
            *px = luma(row_in[pi], row_in[pi + 1], row_in[pi + 2]);
        }
    });

    GrayImage::from_raw(w as u32, h as u32, dst_raw)
        .unwrap_or_else(|| GrayImage::new(w as u32, h as u32))
}

/// Grayscale conversion of any raster. Already-gray input is returned as-is.
pub fn grayscale(src: &Raster) -> GrayImage {
    src.to_luma()
}

// ---------------------------------------------------------------------------
//  Gaussian blur (separable, rayon)
// ---------------------------------------------------------------------------

/// Sigma used when the caller only fixes the kernel size.
pub fn sigma_for_kernel(ksize: u32) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Build a normalized 1-D Gaussian kernel with exactly `ksize` taps.
///
/// `ksize` must be odd. Sizes up to 7 use the fixed small kernels of the
/// common vision libraries so results line up with them bit for bit on flat
/// and step inputs; larger sizes sample the Gaussian at [`sigma_for_kernel`].
pub fn gaussian_kernel(ksize: u32) -> Vec<f32> {
    match ksize {
        0 | 1 => vec![1.0],
        3 => vec![0.25, 0.5, 0.25],
        5 => vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => vec![0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
        _ => {
            let sigma = sigma_for_kernel(ksize);
            let radius = (ksize / 2) as f32;
            let s2 = 2.0 * sigma * sigma;
            let mut kernel: Vec<f32> = (0..ksize)
                .map(|i| {
                    let x = i as f32 - radius;
                    (-x * x / s2).exp()
                })
                .collect();
            let sum: f32 = kernel.iter().sum();
            let inv = 1.0 / sum;
            for v in &mut kernel {
                *v *= inv;
            }
            kernel
        }
    }
}

/// Mirror an out-of-range index back into `0..len` without repeating the
/// edge sample (`gfedcb|abcdefgh|gfedcba`).
#[inline]
pub(crate) fn reflect_101(mut i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    while i < 0 || i > last {
        if i < 0 {
            i = -i;
        }
        if i > last {
            i = 2 * last - i;
        }
    }
    i as usize
}

/// Blur an interleaved 8-bit buffer with `channels` samples per pixel.
fn separable_blur(src: &[u8], w: usize, h: usize, channels: usize, kernel: &[f32]) -> Vec<u8> {
    if w == 0 || h == 0 || kernel.len() <= 1 {
        return src.to_vec();
    }
    let radius = (kernel.len() / 2) as isize;
    let stride = w * channels;

    let buf_in: Vec<f32> = src.iter().map(|&b| b as f32).collect();

    // --- Horizontal pass (parallel by row) ---
    let mut buf_h = vec![0.0f32; stride * h];
    buf_h.par_chunks_mut(stride).enumerate().for_each(|(y, row_out)| {
        let row_in = &buf_in[y * stride..(y + 1) * stride];
        for x in 0..w {
            for c in 0..channels {
                let mut acc = 0.0f32;
                for (ki, &kv) in kernel.iter().enumerate() {
                    let sx = reflect_101(x as isize + ki as isize - radius, w);
                    acc += row_in[sx * channels + c] * kv;
                }
                row_out[x * channels + c] = acc;
            }
        }
    });

    // --- Vertical pass (parallel by row) ---
    let mut dst = vec![0u8; stride * h];
    dst.par_chunks_mut(stride).enumerate().for_each(|(y, row_out)| {
        for (i, out) in row_out.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                let sy = reflect_101(y as isize + ki as isize - radius, h);
                acc += buf_h[sy * stride + i] * kv;
            }
            *out = acc.round().clamp(0.0, 255.0) as u8;
        }
    });

    dst
}

/// Gaussian blur of a single-channel image with a square `ksize` kernel.
pub fn gaussian_blur_gray(src: &GrayImage, ksize: u32) -> GrayImage {
    let kernel = gaussian_kernel(ksize);
    let (w, h) = src.dimensions();
    let raw = separable_blur(src.as_raw(), w as usize, h as usize, 1, &kernel);
    GrayImage::from_raw(w, h, raw).unwrap_or_else(|| src.clone())
}

/// Gaussian blur of an RGB image, channels blurred independently.
pub fn gaussian_blur_rgb(src: &RgbImage, ksize: u32) -> RgbImage {
    let kernel = gaussian_kernel(ksize);
    let (w, h) = src.dimensions();
    let raw = separable_blur(src.as_raw(), w as usize, h as usize, 3, &kernel);
    RgbImage::from_raw(w, h, raw).unwrap_or_else(|| src.clone())
}

/// Blur that keeps the channel layout of its input.
pub fn gaussian_blur(src: &Raster, ksize: u32) -> Raster {
    match src {
        Raster::Gray(g) => Raster::Gray(gaussian_blur_gray(g, ksize)),
        Raster::Color(c) => Raster::Color(gaussian_blur_rgb(c, ksize)),
    }
}
