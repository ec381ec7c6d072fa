//! Menu widgets drawn through a [`Canvas`](crate::render::Canvas).
//!
//! Widgets are plain layout values. Hit boxes are computed without a canvas
//! so screens can test clicks in `handle_input` and draw in `draw` from the
//! same geometry.

pub mod button;
pub mod slider;
pub mod toggle;

use macroquad::color::Color;
use mf_core::Rect;

use crate::render::Canvas;

/// Width estimate for a line of text, used for hit boxes.
pub fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

/// Rectangle of `w`×`h` centered on `(cx, cy)`.
pub fn centered(cx: f32, cy: f32, w: f32, h: f32) -> Rect {
    Rect::new(cx - w / 2.0, cy - h / 2.0, w, h)
}

/// Draw a filled rectangle with a 1-pixel border inside its bounds.
pub fn bordered_rect(canvas: &mut dyn Canvas, rect: Rect, fill: Color, border: Color) {
    canvas.rect(rect, fill);
    canvas.rect_outline(rect, 1.0, border);
}
