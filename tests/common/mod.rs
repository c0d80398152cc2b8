#![allow(dead_code)]

use std::path::PathBuf;

use filterlab::Raster;
use image::{GrayImage, Luma, Rgb, RgbImage};

/// Dark background with a bright filled square at `[x0, x1] × [y0, y1]`.
pub fn bright_square_rgb(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> Raster {
    let img = RgbImage::from_fn(w, h, |x, y| {
        if x >= x0 && x <= x1 && y >= y0 && y <= y1 {
            Rgb([230, 220, 210])
        } else {
            Rgb([20, 25, 30])
        }
    });
    Raster::color(img).expect("non-empty")
}

/// Smooth color ramp with some texture, exercising every channel.
pub fn color_ramp(w: u32, h: u32) -> Raster {
    let img = RgbImage::from_fn(w, h, |x, y| {
        Rgb([
            (x * 255 / w.max(1)) as u8,
            (y * 255 / h.max(1)) as u8,
            ((x * 7 + y * 13) % 256) as u8,
        ])
    });
    Raster::color(img).expect("non-empty")
}

pub fn gray_checker(w: u32, h: u32, cell: u32) -> Raster {
    let img = GrayImage::from_fn(w, h, |x, y| {
        Luma([if ((x / cell) + (y / cell)) % 2 == 0 { 40 } else { 200 }])
    });
    Raster::gray(img).expect("non-empty")
}

/// Fresh per-test scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("filterlab-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}
