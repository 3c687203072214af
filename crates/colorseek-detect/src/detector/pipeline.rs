use std::borrow::Cow;

use colorseek_core::{BoundingBox, Frame, Mask};
use imageproc::filter::gaussian_blur_f32;

use super::{ConfigError, DetectionResult, DetectionTrace, DetectorParams};
use crate::acquisition::is_acquired;
use crate::color_mask::color_mask;
use crate::contour::largest_bounding_box;
use crate::region::apply_exclusions;

/// Stateless single-object detector.
///
/// Every call to [`Detector::detect`] looks at one frame only; the detector
/// holds nothing but its validated parameters.
#[derive(Clone, Debug)]
pub struct Detector {
    params: DetectorParams,
}

impl Detector {
    /// Create a detector, rejecting inconsistent parameters.
    pub fn new(params: DetectorParams) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Detector parameters.
    #[inline]
    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// Run the full pipeline on one frame.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "info", skip_all, fields(width = frame.width(), height = frame.height()))
    )]
    pub fn detect(&self, frame: &Frame) -> DetectionResult {
        let mut mask = self.search_mask(frame);
        let bbox = self.locate(&mask);
        apply_exclusions(&mut mask, &self.params.post_search);
        let result = DetectionResult {
            bbox,
            acquired: is_acquired(&mask),
        };
        log::debug!(
            "{}x{} frame: bbox={:?} acquired={}",
            frame.width(),
            frame.height(),
            result.bbox,
            result.acquired
        );
        result
    }

    /// Like [`Detector::detect`], but also hands back both masks.
    pub fn detect_with_trace(&self, frame: &Frame) -> DetectionTrace {
        let search_mask = self.search_mask(frame);
        let bbox = self.locate(&search_mask);
        let mut acquisition_mask = search_mask.clone();
        apply_exclusions(&mut acquisition_mask, &self.params.post_search);
        DetectionTrace {
            result: DetectionResult {
                bbox,
                acquired: is_acquired(&acquisition_mask),
            },
            search_mask,
            acquisition_mask,
        }
    }

    fn search_mask(&self, frame: &Frame) -> Mask {
        let frame = match self.params.blur_sigma {
            Some(sigma) => Cow::Owned(gaussian_blur_f32(frame, sigma)),
            None => Cow::Borrowed(frame),
        };
        let mut mask = color_mask(&frame, &self.params.color_band);
        apply_exclusions(&mut mask, &self.params.pre_search);
        mask
    }

    fn locate(&self, mask: &Mask) -> Option<BoundingBox> {
        largest_bounding_box(mask, self.params.selection)
    }
}
