//! HSV band thresholding.
//!
//! Hue is stored in half-degrees (`0..=179`) so it fits a byte, the same
//! convention as OpenCV's 8-bit HSV. Saturation and value span `0..=255`.
//! Bands tuned with OpenCV tooling carry over unchanged.

use colorseek_core::{Frame, Mask, MASK_BACKGROUND, MASK_FOREGROUND};
use serde::{Deserialize, Serialize};

use crate::detector::ConfigError;

/// Largest hue value; hue wraps from 179 back to 0.
pub const HUE_MAX: u8 = 179;

/// One pixel in 8-bit HSV.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }
}

/// Inclusive HSV box describing the object color.
///
/// Construct through [`ColorBand::new`] or validate deserialized values with
/// [`ColorBand::validate`]; a band with `lower > upper` on any channel would
/// silently match nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorBand {
    pub lower: Hsv,
    pub upper: Hsv,
}

impl ColorBand {
    pub fn new(lower: Hsv, upper: Hsv) -> Result<Self, ConfigError> {
        let band = Self { lower, upper };
        band.validate()?;
        Ok(band)
    }

    /// Check `lower <= upper` componentwise and that hue stays in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (lo, hi) = (self.lower, self.upper);
        if lo.h > hi.h || lo.s > hi.s || lo.v > hi.v {
            return Err(ConfigError::InvalidColorBand {
                lower: lo,
                upper: hi,
            });
        }
        if hi.h > HUE_MAX {
            return Err(ConfigError::HueOutOfRange { hue: hi.h });
        }
        Ok(())
    }

    #[inline]
    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.lower.h..=self.upper.h).contains(&hsv.h)
            && (self.lower.s..=self.upper.s).contains(&hsv.s)
            && (self.lower.v..=self.upper.v).contains(&hsv.v)
    }
}

impl Default for ColorBand {
    /// Saturated green, roughly 100°..140° of hue.
    fn default() -> Self {
        Self {
            lower: Hsv::new(50, 100, 100),
            upper: Hsv::new(70, 255, 255),
        }
    }
}

/// Convert one RGB pixel to 8-bit HSV.
///
/// `V = max(r, g, b)`, `S = 255 * (V - min) / V`, hue in degrees halved and
/// rounded. Achromatic pixels get hue 0.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> Hsv {
    let [r, g, b] = rgb.map(i32::from);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = v - min;

    let s = if v == 0 { 0 } else { (255 * delta + v / 2) / v };

    let h = if delta == 0 {
        0
    } else {
        let d = delta as f32;
        let mut deg = if v == r {
            60.0 * (g - b) as f32 / d
        } else if v == g {
            120.0 + 60.0 * (b - r) as f32 / d
        } else {
            240.0 + 60.0 * (r - g) as f32 / d
        };
        if deg < 0.0 {
            deg += 360.0;
        }
        let half = (deg * 0.5).round() as i32;
        if half > HUE_MAX as i32 {
            half - 180
        } else {
            half
        }
    };

    Hsv::new(h as u8, s as u8, v as u8)
}

/// Threshold `frame` against `band`.
///
/// The mask has the frame's dimensions; a pixel is 255 iff its HSV value lies
/// inside the band, 0 otherwise.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip_all, fields(width = frame.width(), height = frame.height()))
)]
pub fn color_mask(frame: &Frame, band: &ColorBand) -> Mask {
    let mut mask = Mask::new(frame.width(), frame.height());
    for (dst, px) in mask.pixels_mut().zip(frame.pixels()) {
        dst.0[0] = if band.contains(rgb_to_hsv(px.0)) {
            MASK_FOREGROUND
        } else {
            MASK_BACKGROUND
        };
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorseek_core::{count_foreground, is_background};
    use image::Rgb;

    #[test]
    fn primaries_map_to_expected_hues() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), Hsv::new(0, 255, 255));
        assert_eq!(rgb_to_hsv([0, 255, 0]), Hsv::new(60, 255, 255));
        assert_eq!(rgb_to_hsv([0, 0, 255]), Hsv::new(120, 255, 255));
        assert_eq!(rgb_to_hsv([255, 255, 0]), Hsv::new(30, 255, 255));
    }

    #[test]
    fn grays_have_no_saturation() {
        assert_eq!(rgb_to_hsv([0, 0, 0]), Hsv::new(0, 0, 0));
        assert_eq!(rgb_to_hsv([128, 128, 128]), Hsv::new(0, 0, 128));
        assert_eq!(rgb_to_hsv([255, 255, 255]), Hsv::new(0, 0, 255));
    }

    #[test]
    fn hue_near_360_wraps_to_zero() {
        // Magenta-red just below 360 degrees.
        let hsv = rgb_to_hsv([255, 0, 1]);
        assert_eq!(hsv.h, 0);
        assert!(rgb_to_hsv([255, 0, 128]).h <= HUE_MAX);
    }

    #[test]
    fn band_bounds_are_inclusive() {
        let band = ColorBand::new(Hsv::new(50, 100, 100), Hsv::new(70, 255, 255)).expect("valid");
        assert!(band.contains(Hsv::new(50, 100, 100)));
        assert!(band.contains(Hsv::new(70, 255, 255)));
        assert!(!band.contains(Hsv::new(49, 200, 200)));
        assert!(!band.contains(Hsv::new(60, 99, 200)));
    }

    #[test]
    fn inverted_band_is_rejected() {
        let err = ColorBand::new(Hsv::new(10, 0, 0), Hsv::new(5, 255, 255)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidColorBand { .. }));

        let err = ColorBand::new(Hsv::new(0, 0, 0), Hsv::new(200, 255, 255)).unwrap_err();
        assert!(matches!(err, ConfigError::HueOutOfRange { hue: 200 }));
    }

    #[test]
    fn out_of_band_frame_gives_empty_mask() {
        let band = ColorBand::default();
        for color in [[128, 128, 128], [255, 0, 0], [0, 0, 255], [10, 40, 10]] {
            let frame = Frame::from_pixel(16, 9, Rgb(color));
            let mask = color_mask(&frame, &band);
            assert_eq!(mask.dimensions(), (16, 9));
            assert!(is_background(&mask), "color {color:?} should be out of band");
        }
    }

    #[test]
    fn in_band_pixels_are_foreground() {
        let mut frame = Frame::from_pixel(10, 10, Rgb([128, 128, 128]));
        frame.put_pixel(2, 3, Rgb([0, 255, 0]));
        frame.put_pixel(7, 8, Rgb([20, 200, 20]));

        let mask = color_mask(&frame, &ColorBand::default());
        assert_eq!(count_foreground(&mask), 2);
        assert_eq!(mask.get_pixel(2, 3).0[0], MASK_FOREGROUND);
        assert_eq!(mask.get_pixel(7, 8).0[0], MASK_FOREGROUND);
        assert_eq!(mask.get_pixel(0, 0).0[0], MASK_BACKGROUND);
    }
}
