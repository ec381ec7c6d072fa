//! On/off switch.

use mf_core::Rect;

use crate::render::Canvas;
use crate::theme::{palette, text_size};

/// Switch body for a toggle row centered on `(cx, cy)`. Clicks land here.
pub fn body(cx: f32, cy: f32) -> Rect {
    Rect::new(cx + 70.0, cy - 15.0, 80.0, 30.0)
}

/// Draw a labelled switch, with an optional caption under the label.
pub fn draw_toggle(
    canvas: &mut dyn Canvas,
    label: &str,
    caption: Option<&str>,
    (cx, cy): (f32, f32),
    on: bool,
    highlighted: bool,
) {
    let size = text_size::UI;
    let label_color = if highlighted {
        palette::AMBER
    } else {
        palette::WHITE
    };
    canvas.text_right(label, cx - 30.0, cy - size / 2.0, size, label_color);

    let body = body(cx, cy);
    canvas.rect(body, if on { palette::CYAN } else { palette::DARK_GRAY });
    let knob_x = if on { body.right() - 20.0 } else { body.x + 20.0 };
    canvas.circle(knob_x, cy, 12.0, label_color);

    if let Some(caption) = caption {
        let w = canvas.measure(label, size);
        let caption_size = size * 0.75;
        canvas.text_centered(
            caption,
            cx - 30.0 - w / 2.0,
            cy + size / 2.0 + 5.0,
            caption_size,
            palette::MID_GRAY,
        );
    }
}
