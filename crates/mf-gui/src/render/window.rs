//! Canvas that draws straight to the macroquad window.

use macroquad::prelude::*;
use mf_core::Rect;

use super::{Canvas, Layer};
use crate::assets::AssetCatalog;
use crate::theme::{CANVAS_H, CANVAS_W};

/// Immediate-mode canvas over the letterboxed virtual canvas.
///
/// Requests are drawn as they arrive, so submission order is the
/// composite order.
pub struct WindowCanvas<'a> {
    assets: &'a AssetCatalog,
    layer: Layer,
}

impl<'a> WindowCanvas<'a> {
    /// Canvas resolving image keys against `assets`.
    pub fn new(assets: &'a AssetCatalog) -> Self {
        Self {
            assets,
            layer: Layer::Background,
        }
    }

    /// The layer currently being drawn.
    pub fn layer(&self) -> Layer {
        self.layer
    }
}

impl Canvas for WindowCanvas<'_> {
    fn begin_layer(&mut self, layer: Layer) {
        self.layer = layer;
    }

    fn fill(&mut self, color: Color) {
        draw_rectangle(0.0, 0.0, CANVAS_W, CANVAS_H, color);
    }

    fn rect(&mut self, rect: Rect, color: Color) {
        draw_rectangle(rect.x, rect.y, rect.w, rect.h, color);
    }

    fn rect_outline(&mut self, rect: Rect, thickness: f32, color: Color) {
        draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, thickness, color);
    }

    fn circle(&mut self, x: f32, y: f32, radius: f32, color: Color) {
        draw_circle(x, y, radius, color);
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Color) {
        draw_line(from.0, from.1, to.0, to.1, thickness, color);
    }

    fn text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color) {
        // macroquad places text on its baseline
        draw_text(text, x, y + size * 0.75, size, color);
    }

    fn measure(&self, text: &str, size: f32) -> f32 {
        measure_text(text, None, size as u16, 1.0).width
    }

    fn image(&mut self, key: &str, rect: Rect, tint: Color) -> bool {
        let Some(texture) = self.assets.image(key) else {
            return false;
        };
        draw_texture_ex(
            texture,
            rect.x,
            rect.y,
            tint,
            DrawTextureParams {
                dest_size: Some(vec2(rect.w, rect.h)),
                ..Default::default()
            },
        );
        true
    }
}
