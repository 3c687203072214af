use crate::color_mask::Hsv;
use crate::region::ExclusionRegion;

/// Errors raised while building a detector from its parameters.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("color band lower bound {lower:?} exceeds upper bound {upper:?}")]
    InvalidColorBand { lower: Hsv, upper: Hsv },
    #[error("hue {hue} is out of range (0..=179)")]
    HueOutOfRange { hue: u8 },
    #[error("exclusion region {region:?} has non-finite or negative fractions")]
    InvalidRegion { region: ExclusionRegion },
    #[error("blur sigma must be finite and positive (got {sigma})")]
    InvalidBlurSigma { sigma: f32 },
}
