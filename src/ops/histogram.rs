// ============================================================================
// HISTOGRAM — 256-bin brightness counts and a plot of them
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::raster::Raster;

pub const BINS: usize = 256;

/// Per-intensity pixel counts of a single-channel (luminance) image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    bins: [u64; BINS],
}

impl Default for Histogram {
    fn default() -> Self {
        Self { bins: [0; BINS] }
    }
}

impl Histogram {
    pub fn from_gray(img: &GrayImage) -> Self {
        let mut bins = [0u64; BINS];
        for &v in img.as_raw() {
            bins[v as usize] += 1;
        }
        Self { bins }
    }

    /// Counts over the luminance view of `img` (color is reduced first).
    pub fn from_raster(img: &Raster) -> Self {
        match img {
            Raster::Gray(g) => Self::from_gray(g),
            Raster::Color(_) => Self::from_gray(&img.to_luma()),
        }
    }

    pub fn count(&self, intensity: u8) -> u64 {
        self.bins[intensity as usize]
    }

    /// Sum of all bins; equals the pixel count of the source image.
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Largest single bin.
    pub fn peak(&self) -> u64 {
        self.bins.iter().copied().max().unwrap_or(0)
    }

    /// `intensity,count` rows with a header line.
    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(BINS * 8);
        out.push_str("intensity,count\n");
        for (i, c) in self.bins.iter().enumerate() {
            let _ = writeln!(out, "{},{}", i, c);
        }
        out
    }

    pub fn write_csv(&self, path: &Path) -> std::io::Result<()> {
        fs::write(path, self.to_csv())
    }

    /// Render the counts as a blue polyline on white, scaled so the peak
    /// touches the top edge. `width` is normally 256 (one column per bin).
    pub fn render_plot(&self, width: u32, height: u32) -> RgbImage {
        let width = width.max(2);
        let height = height.max(2);
        let mut plot = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        let peak = self.peak().max(1) as f32;
        let x_scale = (width - 1) as f32 / (BINS - 1) as f32;
        let y_span = (height - 1) as f32;

        let point = |i: usize| -> (f32, f32) {
            let x = i as f32 * x_scale;
            let y = y_span - (self.bins[i] as f32 / peak) * y_span;
            (x, y)
        };

        let mut prev = point(0);
        for i in 1..BINS {
            let next = point(i);
            draw_line_segment_mut(&mut plot, prev, next, PLOT_COLOR);
            prev = next;
        }
        plot
    }
}

const PLOT_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn counts_every_pixel_once() {
        let img = GrayImage::from_fn(16, 4, |x, _| Luma([(x * 16) as u8]));
        let hist = Histogram::from_gray(&img);
        assert_eq!(hist.total(), 64);
        assert_eq!(hist.count(0), 4);
        assert_eq!(hist.count(240), 4);
        assert_eq!(hist.count(1), 0);
        assert_eq!(hist.peak(), 4);
    }

    #[test]
    fn counts_are_not_limited_to_u32() {
        let mut hist = Histogram::default();
        hist.bins[7] = u32::MAX as u64 + 5;
        hist.bins[8] = 10;
        assert_eq!(hist.total(), u32::MAX as u64 + 15);
        assert_eq!(hist.peak(), u32::MAX as u64 + 5);
        assert!(hist.to_csv().contains("7,4294967300\n"));
    }

    #[test]
    fn color_input_uses_luminance() {
        let img = Raster::filled_color(3, 3, [255, 0, 0]).unwrap();
        let hist = Histogram::from_raster(&img);
        assert_eq!(hist.count(76), 9);
    }

    #[test]
    fn csv_has_header_and_one_row_per_bin() {
        let hist = Histogram::from_gray(&GrayImage::from_pixel(2, 2, Luma([3])));
        let csv = hist.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), BINS + 1);
        assert_eq!(lines[0], "intensity,count");
        assert_eq!(lines[4], "3,4");
    }

    #[test]
    fn plot_marks_peak_at_top() {
        let hist = Histogram::from_gray(&GrayImage::from_pixel(4, 4, Luma([0])));
        let plot = hist.render_plot(256, 100);
        assert_eq!(plot.dimensions(), (256, 100));
        assert_eq!(plot.get_pixel(0, 0), &PLOT_COLOR);
        assert_eq!(plot.get_pixel(200, 99), &PLOT_COLOR);
        assert_eq!(plot.get_pixel(200, 10), &Rgb([255, 255, 255]));
    }
}
