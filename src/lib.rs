//! FilterLab — classic image operations behind a single dispatch call.
//!
//! ```no_run
//! use filterlab::{apply, load_image, save_image, OperationKind, ParameterSet};
//! use std::path::Path;
//!
//! let src = load_image(Path::new("photo.jpg"))?;
//! let out = apply(&src, OperationKind::EdgeDetect, ParameterSet::new(50, 150, 5));
//! println!("{} edge pixels", out.image.pixel_count() - out.histogram.count(0));
//! save_image(&out.image, Path::new("edges.png"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[macro_use]
pub mod logger;

pub mod cli;
pub mod config;
pub mod engine;
pub mod io;
pub mod ops;
pub mod raster;
pub mod session;

pub use engine::{OperationKind, ParameterSet, TransformOutput, apply};
pub use io::{LoadError, SaveError, SaveFormat, load_image, save_image};
pub use ops::histogram::Histogram;
pub use raster::Raster;
pub use session::Session;
