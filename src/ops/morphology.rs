// ============================================================================
// MORPHOLOGY — grayscale erosion / dilation with a square structuring element
// ============================================================================
//
// A k×k all-ones element is separable: a running min (or max) along rows
// followed by the same along columns gives the 2-D result. Pixels outside the
// image never win, so the window is simply clipped at the borders.

use image::GrayImage;
use rayon::prelude::*;

/// Replace each pixel with the darkest value in its `ksize`×`ksize` window.
pub fn erode(src: &GrayImage, ksize: u32) -> GrayImage {
    morph_square(src, ksize, |a, b| a.min(b))
}

/// Replace each pixel with the brightest value in its `ksize`×`ksize` window.
pub fn dilate(src: &GrayImage, ksize: u32) -> GrayImage {
    morph_square(src, ksize, |a, b| a.max(b))
}

fn morph_square<F>(src: &GrayImage, ksize: u32, pick: F) -> GrayImage
where
    F: Fn(u8, u8) -> u8 + Sync,
{
    let (w, h) = (src.width() as usize, src.height() as usize);
    let r = (ksize / 2) as usize;
    if w == 0 || h == 0 || r == 0 {
        return src.clone();
    }
    let src_raw = src.as_raw();

    // Rows
    let mut pass_h = vec![0u8; w * h];
    pass_h.par_chunks_mut(w).enumerate().for_each(|(y, row_out)| {
        let row_in = &src_raw[y * w..(y + 1) * w];
        for (x, out) in row_out.iter_mut().enumerate() {
            let x0 = x.saturating_sub(r);
            let x1 = (x + r).min(w - 1);
            let mut acc = row_in[x];
            for &v in &row_in[x0..=x1] {
                acc = pick(acc, v);
            }
            *out = acc;
        }
    });

    // Columns
    let mut dst = vec![0u8; w * h];
    dst.par_chunks_mut(w).enumerate().for_each(|(y, row_out)| {
        let y0 = y.saturating_sub(r);
        let y1 = (y + r).min(h - 1);
        for (x, out) in row_out.iter_mut().enumerate() {
            let mut acc = pass_h[y * w + x];
            for yy in y0..=y1 {
                acc = pick(acc, pass_h[yy * w + x]);
            }
            *out = acc;
        }
    });

    GrayImage::from_raw(w as u32, h as u32, dst).unwrap_or_else(|| src.clone())
}
