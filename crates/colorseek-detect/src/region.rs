//! Exclusion regions: rectangles forced to background in the mask.

use colorseek_core::{Mask, PixelRect, MASK_BACKGROUND};
use serde::{Deserialize, Serialize};

use crate::detector::ConfigError;

/// Rectangle to clear from the mask.
///
/// `Fraction` values are relative to the mask size and resolved every time
/// the region is applied, so one configuration works at any resolution.
/// Either form may extend past the mask; only the overlapping part is
/// cleared.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExclusionRegion {
    Pixels {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },
    Fraction {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl ExclusionRegion {
    /// Full-width band from `start` (fraction of height) to the bottom edge.
    pub fn bottom_band(start: f64) -> Self {
        Self::Fraction {
            x: 0.0,
            y: start,
            width: 1.0,
            height: 1.0 - start,
        }
    }

    /// Full-height band along the left edge, `width` as a fraction of width.
    pub fn left_band(width: f64) -> Self {
        Self::Fraction {
            x: 0.0,
            y: 0.0,
            width,
            height: 1.0,
        }
    }

    /// Whole-frame region.
    pub fn everything() -> Self {
        Self::Fraction {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Self::Fraction {
            x,
            y,
            width,
            height,
        } = *self
        {
            if ![x, y, width, height].iter().all(|v| v.is_finite()) || width < 0.0 || height < 0.0
            {
                return Err(ConfigError::InvalidRegion { region: *self });
            }
        }
        Ok(())
    }

    /// Resolve to pixels for a `width x height` mask.
    ///
    /// Fractional edges are rounded to the nearest pixel. Returns `None` when
    /// the region does not overlap the mask or has zero area.
    pub fn resolve(&self, width: u32, height: u32) -> Option<PixelRect> {
        let (x0, y0, x1, y1) = match *self {
            Self::Pixels {
                x,
                y,
                width: w,
                height: h,
            } => (x, y, x.saturating_add(w as i64), y.saturating_add(h as i64)),
            Self::Fraction {
                x,
                y,
                width: fw,
                height: fh,
            } => {
                let w = width as f64;
                let h = height as f64;
                // `as` saturates: overflowing products pin to the i64 range.
                let edge = |v: f64| v.round() as i64;
                (
                    edge(x * w),
                    edge(y * h),
                    edge((x + fw) * w),
                    edge((y + fh) * h),
                )
            }
        };
        PixelRect::from_edges_clipped(x0, y0, x1, y1, width, height)
    }
}

/// Force every pixel of `rect` to background.
///
/// `rect` must lie inside the mask, which is what [`ExclusionRegion::resolve`]
/// guarantees.
pub fn clear_rect(mask: &mut Mask, rect: PixelRect) {
    let stride = mask.width() as usize;
    let x0 = rect.x as usize;
    let x1 = x0 + rect.width as usize;
    let buf: &mut [u8] = mask;
    for row in rect.y as usize..(rect.y + rect.height) as usize {
        let start = row * stride;
        buf[start + x0..start + x1].fill(MASK_BACKGROUND);
    }
}

/// Clear every region in `regions` from `mask`, in order.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip_all, fields(regions = regions.len()))
)]
pub fn apply_exclusions(mask: &mut Mask, regions: &[ExclusionRegion]) {
    let (width, height) = mask.dimensions();
    for region in regions {
        match region.resolve(width, height) {
            Some(rect) => {
                log::trace!("clearing {rect:?} of {width}x{height} mask");
                clear_rect(mask, rect);
            }
            None => log::trace!("{region:?} misses {width}x{height} mask"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorseek_core::{count_foreground, is_background, MASK_FOREGROUND};

    fn full_mask(w: u32, h: u32) -> Mask {
        Mask::from_pixel(w, h, image::Luma([MASK_FOREGROUND]))
    }

    #[test]
    fn default_bands_resolve_on_100px_frame() {
        assert_eq!(
            ExclusionRegion::bottom_band(0.8).resolve(100, 100),
            Some(PixelRect::new(0, 80, 100, 20))
        );
        assert_eq!(
            ExclusionRegion::left_band(0.3).resolve(100, 100),
            Some(PixelRect::new(0, 0, 30, 100))
        );
    }

    #[test]
    fn fractions_track_resolution() {
        assert_eq!(
            ExclusionRegion::bottom_band(0.8).resolve(640, 480),
            Some(PixelRect::new(0, 384, 640, 96))
        );
        assert_eq!(
            ExclusionRegion::left_band(0.3).resolve(640, 480),
            Some(PixelRect::new(0, 0, 192, 480))
        );
    }

    #[test]
    fn whole_mask_region_clears_everything() {
        let mut mask = full_mask(37, 23);
        apply_exclusions(&mut mask, &[ExclusionRegion::everything()]);
        assert!(is_background(&mask));

        let mut mask = full_mask(37, 23);
        apply_exclusions(
            &mut mask,
            &[ExclusionRegion::Pixels {
                x: -10,
                y: -10,
                width: 100,
                height: 100,
            }],
        );
        assert!(is_background(&mask));
    }

    #[test]
    fn zero_area_region_leaves_mask_unchanged() {
        let mut mask = full_mask(20, 20);
        mask.put_pixel(3, 3, image::Luma([0]));
        let before = mask.clone();
        apply_exclusions(
            &mut mask,
            &[
                ExclusionRegion::Pixels {
                    x: 5,
                    y: 5,
                    width: 0,
                    height: 10,
                },
                ExclusionRegion::left_band(0.0),
            ],
        );
        assert_eq!(mask, before);
    }

    #[test]
    fn region_outside_mask_is_noop() {
        let mut mask = full_mask(10, 10);
        let region = ExclusionRegion::Pixels {
            x: 50,
            y: 0,
            width: 5,
            height: 5,
        };
        assert_eq!(region.resolve(10, 10), None);
        apply_exclusions(&mut mask, &[region]);
        assert_eq!(count_foreground(&mask), 100);
    }

    #[test]
    fn partial_overlap_is_clipped() {
        let mut mask = full_mask(10, 10);
        apply_exclusions(
            &mut mask,
            &[ExclusionRegion::Pixels {
                x: 8,
                y: -2,
                width: 5,
                height: 4,
            }],
        );
        // Columns 8..10, rows 0..2.
        assert_eq!(count_foreground(&mask), 96);
        assert_eq!(mask.get_pixel(9, 1).0[0], 0);
        assert_eq!(mask.get_pixel(9, 2).0[0], MASK_FOREGROUND);
    }

    #[test]
    fn oversized_fractions_cover_the_whole_mask() {
        let huge = ExclusionRegion::Fraction {
            x: 0.0,
            y: 0.0,
            width: 1e308,
            height: 1e308,
        };
        assert!(huge.validate().is_ok());
        assert_eq!(huge.resolve(64, 48), Some(PixelRect::new(0, 0, 64, 48)));

        let far_left = ExclusionRegion::Fraction {
            x: -1e308,
            y: 0.0,
            width: 1e308,
            height: 1.0,
        };
        assert!(far_left.validate().is_ok());
        // Ends exactly at the left edge.
        assert_eq!(far_left.resolve(10, 10), None);

        let mut mask = full_mask(10, 10);
        apply_exclusions(&mut mask, &[huge]);
        assert!(is_background(&mask));
    }

    #[test]
    fn bad_fractions_fail_validation() {
        assert!(ExclusionRegion::left_band(f64::NAN).validate().is_err());
        assert!(ExclusionRegion::left_band(-0.1).validate().is_err());
        assert!(ExclusionRegion::bottom_band(0.8).validate().is_ok());
    }

    #[test]
    fn regions_round_trip_through_json() {
        let json = r#"[{"kind":"fraction","x":0.0,"y":0.8,"width":1.0,"height":0.2},
                       {"kind":"pixels","x":-4,"y":0,"width":10,"height":3}]"#;
        let regions: Vec<ExclusionRegion> = serde_json::from_str(json).expect("parse");
        assert_eq!(regions[1].resolve(8, 8), Some(PixelRect::new(0, 0, 6, 3)));
        assert_eq!(regions[0].resolve(10, 10), Some(PixelRect::new(0, 8, 10, 2)));
    }
}
