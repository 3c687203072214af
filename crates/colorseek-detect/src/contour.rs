//! Contour extraction and largest-region selection.

use colorseek_core::{BoundingBox, Contour, Mask};
use image::imageops::replace;
use imageproc::contours::{find_contours, BorderType};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// How "largest" is measured when picking one contour out of many.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Rank contours by the number of boundary points.
    ///
    /// This is a perimeter proxy, not enclosed area: an elongated or ragged
    /// region beats a compact one of the same area. Kept as the detection
    /// behavior the acquisition thresholds were tuned against.
    #[default]
    ApproximateSizeByBoundaryPointCount,
}

/// Outer borders of all foreground regions in `mask`.
///
/// Every border pixel is kept (no polygon approximation). Hole borders are
/// dropped. Regions touching the image edge are found like any other. The
/// order is the raster order in which the border-following routine meets
/// each region's first pixel; callers should not depend on it beyond
/// tie-breaking in [`select_largest`].
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip_all, fields(width = mask.width(), height = mask.height()))
)]
pub fn find_outer_contours(mask: &Mask) -> Vec<Contour> {
    // The border follower never starts an outer border in column 0, so the
    // search runs on a copy with a one-pixel background frame.
    let mut padded = Mask::new(mask.width() + 2, mask.height() + 2);
    replace(&mut padded, mask, 1, 1);

    find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer))
        .map(|c| {
            Contour::new(
                c.points
                    .iter()
                    .map(|p| Point2::new(p.x - 1, p.y - 1))
                    .collect(),
            )
        })
        .collect()
}

/// Pick the largest contour under `policy`.
///
/// On ties the earliest contour in `contours` wins. Returns `None` for an
/// empty slice.
pub fn select_largest(contours: &[Contour], policy: SelectionPolicy) -> Option<&Contour> {
    match policy {
        SelectionPolicy::ApproximateSizeByBoundaryPointCount => {
            let mut best: Option<&Contour> = None;
            for c in contours {
                if best.is_none_or(|b| c.len() > b.len()) {
                    best = Some(c);
                }
            }
            best
        }
    }
}

/// Extract contours from `mask` and box the largest one.
///
/// An all-background mask yields `None`; that is the normal "object not in
/// view" outcome, not a failure.
pub fn largest_bounding_box(mask: &Mask, policy: SelectionPolicy) -> Option<BoundingBox> {
    let contours = find_outer_contours(mask);
    let best = select_largest(&contours, policy)?;
    log::trace!(
        "{} contour(s), largest has {} boundary points",
        contours.len(),
        best.len()
    );
    best.bounding_box()
}
