//! Horizontal volume slider.

use mf_core::Rect;

use crate::render::Canvas;
use crate::theme::{palette, text_size};

/// Half the track width.
pub const HALF_TRACK: f32 = 150.0;

/// Clickable area of the slider centered on `(cx, cy)`.
pub fn hit_box(cx: f32, cy: f32) -> Rect {
    Rect::new(cx - HALF_TRACK, cy - 15.0, HALF_TRACK * 2.0, 30.0)
}

/// Value under canvas x `x`, clamped to `0.0..=1.0`.
pub fn value_at(cx: f32, x: f32) -> f32 {
    ((x - (cx - HALF_TRACK)) / (HALF_TRACK * 2.0)).clamp(0.0, 1.0)
}

/// Draw a labelled slider showing `value`.
pub fn draw_slider(
    canvas: &mut dyn Canvas,
    label: &str,
    cx: f32,
    cy: f32,
    value: f32,
    selected: bool,
) {
    let size = text_size::UI;
    let label_color = if selected {
        palette::AMBER
    } else {
        palette::WHITE
    };
    canvas.text_right(label, cx - 180.0, cy - size / 2.0, size, label_color);

    let track = Rect::new(cx - HALF_TRACK, cy - 5.0, HALF_TRACK * 2.0, 10.0);
    canvas.rect(track, palette::DARK_GRAY);
    let fill_w = track.w * value.clamp(0.0, 1.0);
    canvas.rect(Rect::new(track.x, track.y, fill_w, track.h), palette::CYAN);

    let handle = Rect::new(track.x + fill_w - 4.0, cy - 12.5, 8.0, 25.0);
    canvas.rect(handle, label_color);

    let percent = format!("{:>3}%", (value * 100.0).round() as u32);
    canvas.text(&percent, cx + HALF_TRACK + 20.0, cy - size / 2.0, size, palette::MID_GRAY);
}
