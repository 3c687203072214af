//! Per-frame detection pipeline.
//!
//! This module wires the color mask, the two exclusion passes, contour
//! selection and the acquisition test into one [`Detector`].

mod error;
mod params;
mod pipeline;
mod result;

pub use error::ConfigError;
pub use params::{DetectorParams, BOTTOM_EXCLUSION_START, LEFT_EXCLUSION_WIDTH};
pub use pipeline::Detector;
pub use result::{DetectionResult, DetectionTrace};
