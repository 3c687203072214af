use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::color_mask::ColorBand;
use crate::contour::SelectionPolicy;
use crate::region::ExclusionRegion;

/// Where the default pre-search band starts, as a fraction of frame height.
///
/// Everything from here to the bottom edge is cleared before contour search;
/// that part of the view is mostly floor and picks up reflections.
pub const BOTTOM_EXCLUSION_START: f64 = 0.8;

/// Width of the default post-search band along the left edge, as a fraction
/// of frame width.
pub const LEFT_EXCLUSION_WIDTH: f64 = 0.3;

/// Configuration for the [`Detector`](super::Detector).
///
/// Loaded once and read-only afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorParams {
    /// HSV range of the object color.
    #[serde(default)]
    pub color_band: ColorBand,
    /// Regions cleared before contour search.
    #[serde(default = "default_pre_search")]
    pub pre_search: Vec<ExclusionRegion>,
    /// Regions cleared after contour search, before the acquisition test.
    #[serde(default = "default_post_search")]
    pub post_search: Vec<ExclusionRegion>,
    #[serde(default)]
    pub selection: SelectionPolicy,
    /// Optional Gaussian pre-blur of the frame. `None` disables it.
    #[serde(default)]
    pub blur_sigma: Option<f32>,
}

fn default_pre_search() -> Vec<ExclusionRegion> {
    vec![ExclusionRegion::bottom_band(BOTTOM_EXCLUSION_START)]
}

fn default_post_search() -> Vec<ExclusionRegion> {
    vec![ExclusionRegion::left_band(LEFT_EXCLUSION_WIDTH)]
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            color_band: ColorBand::default(),
            pre_search: default_pre_search(),
            post_search: default_post_search(),
            selection: SelectionPolicy::default(),
            blur_sigma: None,
        }
    }
}

impl DetectorParams {
    /// Default exclusions around a custom color band.
    pub fn for_band(color_band: ColorBand) -> Self {
        Self {
            color_band,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.color_band.validate()?;
        for region in self.pre_search.iter().chain(&self.post_search) {
            region.validate()?;
        }
        if let Some(sigma) = self.blur_sigma {
            if !sigma.is_finite() || sigma <= 0.0 {
                return Err(ConfigError::InvalidBlurSigma { sigma });
            }
        }
        Ok(())
    }
}
