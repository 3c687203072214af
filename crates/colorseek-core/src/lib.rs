//! Core types shared by the colorseek detector crates.
//!
//! This crate is deliberately small: image aliases for the canonical RGB
//! frame and the binary mask, a handful of integer geometry types, and the
//! logger. It knows nothing about color bands or exclusion policies.

mod geometry;
mod raster;
mod logger;

pub use geometry::{BoundingBox, Contour, PixelRect};
pub use raster::{count_foreground, is_background, Frame, Mask, MASK_BACKGROUND, MASK_FOREGROUND};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
