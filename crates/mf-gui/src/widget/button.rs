//! Text button with a hover state.

use mf_core::Rect;

use super::{approx_text_width, centered};
use crate::render::Canvas;
use crate::theme::palette;

/// A clickable line of text centered on a point.
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    /// Caption.
    pub label: String,
    /// Center x.
    pub cx: f32,
    /// Center y.
    pub cy: f32,
    /// Text size.
    pub size: f32,
}

impl Button {
    /// Button centered on `(cx, cy)`.
    pub fn new(label: impl Into<String>, cx: f32, cy: f32, size: f32) -> Self {
        Self {
            label: label.into(),
            cx,
            cy,
            size,
        }
    }

    /// Hit box.
    pub fn bounds(&self) -> Rect {
        centered(
            self.cx,
            self.cy,
            approx_text_width(&self.label, self.size),
            self.size,
        )
    }

    /// Whether a canvas point is on the button.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.bounds().contains(x, y)
    }

    /// Draw in amber when `highlighted`, white otherwise.
    pub fn draw(&self, canvas: &mut dyn Canvas, highlighted: bool) {
        let color = if highlighted {
            palette::AMBER
        } else {
            palette::WHITE
        };
        canvas.text_centered(
            &self.label,
            self.cx,
            self.cy - self.size / 2.0,
            self.size,
            color,
        );
    }
}
