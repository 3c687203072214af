//! Single-object color detector.
//!
//! Each frame goes through five stateless stages:
//!
//! 1. [`color_mask`]: RGB to HSV, then an inclusive [`ColorBand`] test per pixel.
//! 2. [`apply_exclusions`] with the pre-search regions (suppress noisy zones
//!    such as floor glare at the bottom of the frame).
//! 3. [`find_outer_contours`] + [`select_largest`]: pick one region and box it.
//! 4. [`apply_exclusions`] with the post-search regions.
//! 5. [`is_acquired`]: the object counts as acquired once nothing of the mask
//!    survives step 4.
//!
//! [`Detector`] wires the stages together from a [`DetectorParams`]. Nothing
//! is carried from one frame to the next.

pub mod acquisition;
pub mod color_mask;
pub mod contour;
mod detector;
pub mod io;
pub mod region;

pub use acquisition::is_acquired;
pub use color_mask::{color_mask, rgb_to_hsv, ColorBand, Hsv, HUE_MAX};
pub use contour::{find_outer_contours, largest_bounding_box, select_largest, SelectionPolicy};
pub use detector::{
    ConfigError, DetectionResult, DetectionTrace, Detector, DetectorParams,
    BOTTOM_EXCLUSION_START, LEFT_EXCLUSION_WIDTH,
};
pub use region::{apply_exclusions, clear_rect, ExclusionRegion};

pub use colorseek_core::{BoundingBox, Contour, Frame, Mask, PixelRect};
