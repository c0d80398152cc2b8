//! Image-processing primitives used by the transform engine.

pub mod contours;
pub mod edges;
pub mod filters;
pub mod histogram;
pub mod morphology;
