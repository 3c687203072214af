//! Single colored-object detection for a forward-facing robot camera.
//!
//! This crate provides:
//! - re-exports of the detector ([`detect`]) and core types ([`core`]),
//! - [`frame`]: conversion of raw transport frames (`rgb8`, `bgr8`, `mono8`,
//!   PNG/JPEG, ...) into the canonical RGB frame,
//! - [`stream`]: the frame-at-a-time loop between a [`stream::FrameSource`]
//!   and a [`stream::DetectionSink`],
//! - [`annotate`]: overlays for looking at results.
//!
//! ## Quickstart
//!
//! ```no_run
//! use colorseek::detect::{Detector, DetectorParams};
//! use colorseek::frame::{convert_frame, Encoding, RawFrame};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detector = Detector::new(DetectorParams::default())?;
//! let raw = RawFrame::packed(640, 480, Encoding::Bgr8, vec![0; 640 * 480 * 3]);
//! let frame = convert_frame(&raw)?;
//! let result = detector.detect(&frame);
//! println!("bbox={:?} acquired={}", result.bbox, result.acquired);
//! # Ok(())
//! # }
//! ```

pub use colorseek_core as core;
pub use colorseek_detect as detect;

pub use colorseek_core::{BoundingBox, Frame, Mask};
pub use colorseek_detect::{ColorBand, DetectionResult, Detector, DetectorParams, Hsv};

pub mod annotate;
mod error;
pub mod frame;
pub mod stream;

pub use error::Error;

#[cfg(feature = "tracing")]
pub use logging::init_tracing;

#[cfg(feature = "tracing")]
mod logging {
    /// Route both `tracing` spans and `log` records to one subscriber.
    pub fn init_tracing(json: bool) {
        let _ = tracing_log::LogTracer::init();
        colorseek_core::init_tracing(json);
    }
}

/// Load an image file and run `detector` on it.
pub fn detect_file(
    detector: &Detector,
    path: impl AsRef<std::path::Path>,
) -> Result<DetectionResult, Error> {
    let frame = image::open(path)?.to_rgb8();
    Ok(detector.detect(&frame))
}
