//! Acquisition decision from post-search mask occupancy.

use colorseek_core::{count_foreground, Mask};

/// True iff `mask` has no foreground pixel left.
///
/// The caller passes the mask after the post-search exclusions were applied,
/// so "acquired" means every in-band pixel sits inside the excluded zone.
/// This is an occupancy test; it does not look at where the bounding box is.
pub fn is_acquired(mask: &Mask) -> bool {
    let remaining = count_foreground(mask);
    log::trace!("{remaining} foreground pixel(s) outside post-search exclusions");
    remaining == 0
}
