// ============================================================================
// TRANSFORM ENGINE — operation dispatch over a borrowed source image
// ============================================================================
//
// `apply` is a pure function: the source is borrowed read-only, parameters
// arrive by value, and every call allocates a fresh output image plus the
// histogram of that output. Nothing is retained between calls.

use serde::{Deserialize, Serialize};

use crate::ops::contours::{CONTOUR_COLOR, CONTOUR_THICKNESS, draw_outlines_mut, external_contours};
use crate::ops::edges::canny;
use crate::ops::filters::{gaussian_blur, gaussian_blur_gray, grayscale};
use crate::ops::histogram::Histogram;
use crate::ops::morphology::{dilate, erode};
use crate::raster::Raster;

/// Pre-smoothing kernel applied before edge detection.
pub const EDGE_BLUR_KERNEL: u32 = 5;

// ============================================================================
// OPERATION SELECTOR
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationKind {
    #[default]
    Identity,
    Grayscale,
    Blur,
    EdgeDetect,
    Contours,
    Erode,
    Dilate,
}

impl OperationKind {
    pub const ALL: [OperationKind; 7] = [
        OperationKind::Identity,
        OperationKind::Grayscale,
        OperationKind::Blur,
        OperationKind::EdgeDetect,
        OperationKind::Contours,
        OperationKind::Erode,
        OperationKind::Dilate,
    ];

    /// Canonical lowercase name, also used in output file names.
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Identity => "identity",
            OperationKind::Grayscale => "grayscale",
            OperationKind::Blur => "blur",
            OperationKind::EdgeDetect => "edges",
            OperationKind::Contours => "contours",
            OperationKind::Erode => "erode",
            OperationKind::Dilate => "dilate",
        }
    }

    /// Strict lookup. Case, spaces, `-` and `_` are ignored.
    pub fn parse(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        let op = match key.as_str() {
            "identity" | "original" | "none" => OperationKind::Identity,
            "grayscale" | "greyscale" | "gray" | "grey" => OperationKind::Grayscale,
            "blur" | "gaussian" | "gaussianblur" | "smooth" => OperationKind::Blur,
            "edges" | "edge" | "edgedetect" | "canny" => OperationKind::EdgeDetect,
            "contours" | "contour" => OperationKind::Contours,
            "erode" | "erosion" => OperationKind::Erode,
            "dilate" | "dilation" => OperationKind::Dilate,
            _ => return None,
        };
        Some(op)
    }

    /// Lenient lookup: anything unrecognized selects [`OperationKind::Identity`].
    pub fn from_name(name: &str) -> Self {
        match Self::parse(name) {
            Some(op) => op,
            None => {
                log_warn!("Unknown operation '{}', falling back to identity", name);
                OperationKind::Identity
            }
        }
    }

    pub fn uses_thresholds(&self) -> bool {
        matches!(self, OperationKind::EdgeDetect | OperationKind::Contours)
    }

    pub fn uses_kernel(&self) -> bool {
        matches!(self, OperationKind::Blur | OperationKind::Erode | OperationKind::Dilate)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for OperationKind {
    fn from(s: String) -> Self {
        OperationKind::from_name(&s)
    }
}

impl From<OperationKind> for String {
    fn from(op: OperationKind) -> Self {
        op.name().to_string()
    }
}

// ============================================================================
// PARAMETERS
// ============================================================================

pub const THRESHOLD_MAX: u8 = 255;
pub const KERNEL_MIN: u8 = 1;
pub const KERNEL_MAX: u8 = 31;

/// Tunable inputs of the engine. Each operation reads only the fields it needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    pub threshold1: u8,
    pub threshold2: u8,
    pub kernel_size: u8,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            threshold1: 50,
            threshold2: 150,
            kernel_size: 5,
        }
    }
}

impl ParameterSet {
    pub fn new(threshold1: u8, threshold2: u8, kernel_size: u8) -> Self {
        Self {
            threshold1,
            threshold2,
            kernel_size,
        }
    }

    /// Build from unchecked caller input, clamping every field into range.
    pub fn clamped(threshold1: i64, threshold2: i64, kernel_size: i64) -> Self {
        Self {
            threshold1: threshold1.clamp(0, THRESHOLD_MAX as i64) as u8,
            threshold2: threshold2.clamp(0, THRESHOLD_MAX as i64) as u8,
            kernel_size: kernel_size.clamp(KERNEL_MIN as i64, KERNEL_MAX as i64) as u8,
        }
    }

    /// Kernel side actually used by blur and morphology.
    pub fn effective_kernel(&self) -> u32 {
        odd_kernel(self.kernel_size)
    }
}

/// Even sizes are bumped to the next odd value; odd sizes pass through.
pub fn odd_kernel(k: u8) -> u32 {
    let k = k as u32;
    if k % 2 == 0 { k + 1 } else { k }
}

// ============================================================================
// APPLY
// ============================================================================

/// Result of one engine invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformOutput {
    pub image: Raster,
    pub histogram: Histogram,
}

/// Run `op` on `source` and compute the brightness histogram of the result.
pub fn apply(source: &Raster, op: OperationKind, params: ParameterSet) -> TransformOutput {
    let image = transform(source, op, params);
    let histogram = Histogram::from_raster(&image);
    TransformOutput { image, histogram }
}

/// The image half of [`apply`].
pub fn transform(source: &Raster, op: OperationKind, params: ParameterSet) -> Raster {
    if source.pixel_count() == 0 {
        log_warn!("Skipping '{}' on an empty image", op);
        return source.clone();
    }
    match op {
        OperationKind::Identity => source.clone(),
        OperationKind::Grayscale => Raster::Gray(grayscale(source)),
        OperationKind::Blur => gaussian_blur(source, params.effective_kernel()),
        OperationKind::EdgeDetect => Raster::Gray(edge_map(source, params)),
        OperationKind::Contours => {
            let edges = edge_map(source, params);
            let outlines = external_contours(&edges);
            let mut canvas = source.to_color();
            draw_outlines_mut(&mut canvas, &outlines, CONTOUR_COLOR, CONTOUR_THICKNESS);
            Raster::Color(canvas)
        }
        OperationKind::Erode => Raster::Gray(erode(&grayscale(source), params.effective_kernel())),
        OperationKind::Dilate => Raster::Gray(dilate(&grayscale(source), params.effective_kernel())),
    }
}

/// Grayscale → fixed 5×5 Gaussian → Canny(threshold1, threshold2).
fn edge_map(source: &Raster, params: ParameterSet) -> image::GrayImage {
    let smoothed = gaussian_blur_gray(&grayscale(source), EDGE_BLUR_KERNEL);
    canny(&smoothed, params.threshold1, params.threshold2)
}
