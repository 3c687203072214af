//! Canonical in-memory image types.

/// Canonical color frame: 8-bit RGB, row-major, tightly packed.
pub type Frame = image::RgbImage;

/// Binary single-channel mask. Pixels are either [`MASK_BACKGROUND`] or
/// [`MASK_FOREGROUND`].
pub type Mask = image::GrayImage;

pub const MASK_BACKGROUND: u8 = 0;
pub const MASK_FOREGROUND: u8 = 255;

/// Number of nonzero pixels in `mask`.
#[inline]
pub fn count_foreground(mask: &Mask) -> usize {
    mask.as_raw().iter().filter(|&&v| v != MASK_BACKGROUND).count()
}

/// True when `mask` holds no foreground pixel at all.
#[inline]
pub fn is_background(mask: &Mask) -> bool {
    mask.as_raw().iter().all(|&v| v == MASK_BACKGROUND)
}
