// ============================================================================
// IMAGE I/O — decode from disk into a Raster, encode a Raster back out
// ============================================================================

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tga::TgaEncoder;
use image::codecs::tiff::TiffEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ColorType, ImageEncoder, ImageError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::raster::Raster;

/// Default JPEG quality when the caller does not pick one.
pub const DEFAULT_QUALITY: u8 = 90;

// ============================================================================
// ERRORS
// ============================================================================

/// Reasons an image could not be loaded.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be opened or read.
    Io(std::io::Error),
    /// The bytes are not a supported or valid image.
    Decode(String),
    /// The image decoded to zero width or height.
    Empty,
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "I/O error: {}", e),
            LoadError::Decode(e) => write!(f, "Unsupported or corrupt image: {}", e),
            LoadError::Empty => write!(f, "Image has no pixels"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<ImageError> for LoadError {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::IoError(io) => LoadError::Io(io),
            other => LoadError::Decode(other.to_string()),
        }
    }
}

/// Reasons an image could not be written.
#[derive(Debug)]
pub enum SaveError {
    /// Destination could not be created or written.
    Io(std::io::Error),
    /// The encoder rejected the image.
    Encode(String),
    /// There is no processed image to export yet.
    NothingToSave,
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {}", e),
            SaveError::Encode(e) => write!(f, "Encoding failed: {}", e),
            SaveError::NothingToSave => write!(f, "No processed image to save"),
        }
    }
}

impl std::error::Error for SaveError {}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<ImageError> for SaveError {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::IoError(io) => SaveError::Io(io),
            other => SaveError::Encode(other.to_string()),
        }
    }
}

// ============================================================================
// FORMATS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SaveFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
    Tga,
    Tiff,
    /// Lossless WebP.
    Webp,
}

impl SaveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
            SaveFormat::Bmp => "bmp",
            SaveFormat::Tga => "tga",
            SaveFormat::Tiff => "tiff",
            SaveFormat::Webp => "webp",
        }
    }

    /// Format for a name or extension such as `"jpg"` or `"TIFF"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim_start_matches('.').to_lowercase().as_str() {
            "png" => Some(SaveFormat::Png),
            "jpg" | "jpeg" => Some(SaveFormat::Jpeg),
            "bmp" => Some(SaveFormat::Bmp),
            "tga" => Some(SaveFormat::Tga),
            "tif" | "tiff" => Some(SaveFormat::Tiff),
            "webp" => Some(SaveFormat::Webp),
            _ => None,
        }
    }

    /// Format implied by the path's extension, PNG when unknown or missing.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(SaveFormat::from_name)
            .unwrap_or_default()
    }

    /// Only JPEG takes a quality setting; the rest are lossless.
    pub fn supports_quality(&self) -> bool {
        matches!(self, SaveFormat::Jpeg)
    }
}

// ============================================================================
// LOAD / SAVE
// ============================================================================

/// Decode an image file into a [`Raster`].
///
/// Every format the `image` crate was built with is accepted; the decoder is
/// picked from the file contents, falling back to the extension.
pub fn load_image(path: &Path) -> Result<Raster, LoadError> {
    let reader = image::io::Reader::open(path)?.with_guessed_format()?;
    let decoded = reader.decode()?;
    let raster = Raster::from_dynamic(decoded).ok_or(LoadError::Empty)?;
    log_info!(
        "Loaded {} ({}x{}, {} channel(s))",
        path.display(),
        raster.width(),
        raster.height(),
        raster.channels()
    );
    Ok(raster)
}

/// Encode `image` to `path`, choosing the format from the extension.
pub fn save_image(image: &Raster, path: &Path) -> Result<(), SaveError> {
    save_image_with(image, path, SaveFormat::from_path(path), DEFAULT_QUALITY)
}

/// Encode `image` to `path` with an explicit format and JPEG quality.
///
/// Grayscale rasters are written single-channel, color rasters as RGB.
pub fn save_image_with(
    image: &Raster,
    path: &Path,
    format: SaveFormat,
    quality: u8,
) -> Result<(), SaveError> {
    let (w, h) = image.dimensions();
    let color = if image.is_gray() { ColorType::L8 } else { ColorType::Rgb8 };
    let buf = image.as_raw();

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match format {
        SaveFormat::Png => PngEncoder::new(&mut writer).write_image(buf, w, h, color)?,
        SaveFormat::Jpeg => {
            JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100))
                .write_image(buf, w, h, color)?
        }
        SaveFormat::Bmp => BmpEncoder::new(&mut writer).write_image(buf, w, h, color)?,
        SaveFormat::Tga => TgaEncoder::new(&mut writer).write_image(buf, w, h, color)?,
        SaveFormat::Tiff => TiffEncoder::new(&mut writer).write_image(buf, w, h, color)?,
        SaveFormat::Webp => WebPEncoder::new_lossless(&mut writer).write_image(buf, w, h, color)?,
    }

    // Dropping a BufWriter discards flush errors, so a full disk would look like success.
    writer.flush()?;

    log_info!("Saved {} as {:?} ({}x{})", path.display(), format, w, h);
    Ok(())
}
