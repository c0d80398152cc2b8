// ============================================================================
// RASTER — the in-memory image handed between I/O and the transform engine
// ============================================================================

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

use crate::ops::filters::rgb_to_luma;

/// An 8-bit image with either one (luma) or three (RGB) channels.
///
/// Use [`Raster::gray`] / [`Raster::color`] to build one from a buffer; they
/// reject zero-sized images. Building a variant directly skips that check;
/// the engine hands such an image back unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Raster {
    Gray(GrayImage),
    Color(RgbImage),
}

impl Raster {
    /// Wrap a single-channel buffer. Returns `None` for a zero-sized image.
    pub fn gray(img: GrayImage) -> Option<Self> {
        if img.width() == 0 || img.height() == 0 {
            return None;
        }
        Some(Raster::Gray(img))
    }

    /// Wrap a three-channel RGB buffer. Returns `None` for a zero-sized image.
    pub fn color(img: RgbImage) -> Option<Self> {
        if img.width() == 0 || img.height() == 0 {
            return None;
        }
        Some(Raster::Color(img))
    }

    /// Reduce a decoded image to the 1- or 3-channel 8-bit model.
    /// Luma inputs (with or without alpha, any depth) stay single-channel,
    /// everything else becomes RGB with alpha dropped.
    pub fn from_dynamic(img: DynamicImage) -> Option<Self> {
        match img {
            DynamicImage::ImageLuma8(g) => Raster::gray(g),
            DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_) => Raster::gray(img.into_luma8()),
            DynamicImage::ImageRgb8(c) => Raster::color(c),
            other => Raster::color(other.into_rgb8()),
        }
    }

    /// Solid-fill constructor, mostly for tests and placeholders.
    pub fn filled_color(width: u32, height: u32, rgb: [u8; 3]) -> Option<Self> {
        Raster::color(RgbImage::from_pixel(width, height, Rgb(rgb)))
    }

    pub fn filled_gray(width: u32, height: u32, value: u8) -> Option<Self> {
        Raster::gray(GrayImage::from_pixel(width, height, Luma([value])))
    }

    pub fn width(&self) -> u32 {
        match self {
            Raster::Gray(g) => g.width(),
            Raster::Color(c) => c.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Raster::Gray(g) => g.height(),
            Raster::Color(c) => c.height(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// 1 for grayscale, 3 for color.
    pub fn channels(&self) -> u8 {
        match self {
            Raster::Gray(_) => 1,
            Raster::Color(_) => 3,
        }
    }

    pub fn is_gray(&self) -> bool {
        matches!(self, Raster::Gray(_))
    }

    pub fn pixel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Single-channel luminance view. Grayscale images are cloned as-is.
    pub fn to_luma(&self) -> GrayImage {
        match self {
            Raster::Gray(g) => g.clone(),
            Raster::Color(c) => rgb_to_luma(c),
        }
    }

    /// Three-channel view. Grayscale values are replicated into R, G and B.
    pub fn to_color(&self) -> RgbImage {
        match self {
            Raster::Color(c) => c.clone(),
            Raster::Gray(g) => {
                let mut out = RgbImage::new(g.width(), g.height());
                for (dst, src) in out.pixels_mut().zip(g.pixels()) {
                    let v = src[0];
                    *dst = Rgb([v, v, v]);
                }
                out
            }
        }
    }

    /// Raw interleaved bytes (1 or 3 per pixel).
    pub fn as_raw(&self) -> &[u8] {
        match self {
            Raster::Gray(g) => g.as_raw(),
            Raster::Color(c) => c.as_raw(),
        }
    }
}
