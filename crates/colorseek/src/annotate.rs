//! Drawing helpers for visual inspection of detections.

use colorseek_core::{BoundingBox, Frame, Mask, MASK_BACKGROUND};
use colorseek_detect::DetectionResult;
use image::Rgb;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const ACQUIRED_BOX_COLOR: Rgb<u8> = Rgb([255, 160, 0]);
pub const DEFAULT_THICKNESS: u32 = 2;

/// Draw `bbox` as a hollow rectangle `thickness` pixels wide, growing inward.
pub fn draw_box(frame: &mut Frame, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    for i in 0..thickness {
        let inset = 2 * i;
        if bbox.width <= inset || bbox.height <= inset {
            break;
        }
        let rect = Rect::at(bbox.x + i as i32, bbox.y + i as i32)
            .of_size(bbox.width - inset, bbox.height - inset);
        draw_hollow_rect_mut(frame, rect, color);
    }
}

/// Draw the detection box, if any. Acquired detections use
/// [`ACQUIRED_BOX_COLOR`].
pub fn draw_detection(frame: &mut Frame, result: &DetectionResult) {
    if let Some(bbox) = &result.bbox {
        let color = if result.acquired {
            ACQUIRED_BOX_COLOR
        } else {
            BOX_COLOR
        };
        draw_box(frame, bbox, color, DEFAULT_THICKNESS);
    }
}

/// Blend `color` at 50 % over every foreground pixel of `mask`.
///
/// `mask` must have the frame's dimensions; mismatched sizes are ignored.
pub fn tint_mask(frame: &mut Frame, mask: &Mask, color: Rgb<u8>) {
    if frame.dimensions() != mask.dimensions() {
        log::warn!(
            "mask {:?} does not match frame {:?}, not tinting",
            mask.dimensions(),
            frame.dimensions()
        );
        return;
    }
    for (px, m) in frame.pixels_mut().zip(mask.pixels()) {
        if m.0[0] != MASK_BACKGROUND {
            for (c, t) in px.0.iter_mut().zip(color.0) {
                *c = ((*c as u16 + t as u16) / 2) as u8;
            }
        }
    }
}
