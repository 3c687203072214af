use colorseek_core::{BoundingBox, Mask};
use serde::{Deserialize, Serialize};

/// Outcome of one frame.
///
/// `bbox` is `None` when no foreground region survived the pre-search
/// exclusions. Nothing here refers to earlier frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub bbox: Option<BoundingBox>,
    pub acquired: bool,
}

impl DetectionResult {
    #[inline]
    pub fn is_detected(&self) -> bool {
        self.bbox.is_some()
    }
}

/// A [`DetectionResult`] together with the intermediate masks, for
/// debugging and visualization.
#[derive(Clone, Debug)]
pub struct DetectionTrace {
    pub result: DetectionResult,
    /// Band mask after the pre-search exclusions; the contour search input.
    pub search_mask: Mask,
    /// Band mask after the post-search exclusions; the acquisition input.
    pub acquisition_mask: Mask,
}
