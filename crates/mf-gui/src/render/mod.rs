//! Draw-request abstraction between the screens and the window.
//!
//! Screens never call macroquad directly; they submit requests to a
//! [`Canvas`], grouped into [`Layer`]s. The window implementation renders
//! them immediately, the recording implementation keeps them for tests.

mod window;

use macroquad::color::Color;
use mf_core::Rect;

pub use window::WindowCanvas;

/// Composited layers, in back-to-front order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    /// Floor fill and flicker.
    Background,
    /// Digital rain.
    Particles,
    /// Mirrored entities under the floor line.
    Reflections,
    /// Walls and interactive objects.
    World,
    /// Hunters.
    Hostiles,
    /// The player.
    Player,
    /// Darkness with light pools cut out.
    Lighting,
    /// Faces surfacing in reflective surfaces.
    ReflectionEcho,
    /// Static over corrupted objects.
    CorruptedStatic,
    /// Chromatic split, tearing, scanlines and static bursts.
    Glitch,
    /// Popup messages.
    Popups,
    /// Screen-edge darkening.
    Vignette,
    /// Minimap or holographic radar.
    Map,
    /// Prompts, location name and menu text.
    Hud,
    /// The full-screen face.
    Jumpscare,
    /// Screen transition fades.
    Fade,
}

/// Something that accepts draw requests.
///
/// Text coordinates are the top-left corner of the line.
pub trait Canvas {
    /// Start submitting requests for `layer`.
    fn begin_layer(&mut self, layer: Layer);
    /// Cover the whole canvas.
    fn fill(&mut self, color: Color);
    /// Filled rectangle.
    fn rect(&mut self, rect: Rect, color: Color);
    /// Rectangle outline.
    fn rect_outline(&mut self, rect: Rect, thickness: f32, color: Color);
    /// Filled circle.
    fn circle(&mut self, x: f32, y: f32, radius: f32, color: Color);
    /// Line segment.
    fn line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Color);
    /// One line of text.
    fn text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color);
    /// Width of `text` at `size`.
    fn measure(&self, text: &str, size: f32) -> f32;
    /// Draw the image `key` stretched over `rect`. Returns `false` when the
    /// image is not loaded and nothing was drawn.
    fn image(&mut self, key: &str, rect: Rect, tint: Color) -> bool;

    /// Text centered horizontally on `cx`.
    fn text_centered(&mut self, text: &str, cx: f32, y: f32, size: f32, color: Color) {
        let w = self.measure(text, size);
        self.text(text, cx - w / 2.0, y, size, color);
    }

    /// Text whose right edge sits on `right`.
    fn text_right(&mut self, text: &str, right: f32, y: f32, size: f32, color: Color) {
        let w = self.measure(text, size);
        self.text(text, right - w, y, size, color);
    }

    /// Draw an image, or a flat placeholder rectangle when it is missing.
    fn image_or_placeholder(&mut self, key: Option<&str>, rect: Rect, tint: Color, fallback: Color) {
        if !key.is_some_and(|k| self.image(k, rect, tint)) {
            self.rect(rect, fallback);
        }
    }
}

/// One recorded request.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    /// [`Canvas::fill`].
    Fill(Color),
    /// [`Canvas::rect`].
    Rect(Rect, Color),
    /// [`Canvas::rect_outline`].
    RectOutline(Rect, Color),
    /// [`Canvas::circle`].
    Circle {
        /// Center.
        center: (f32, f32),
        /// Radius.
        radius: f32,
    },
    /// [`Canvas::line`].
    Line,
    /// [`Canvas::text`].
    Text(String),
    /// [`Canvas::image`], loaded or not.
    Image {
        /// Requested key.
        key: String,
        /// Whether the image was available.
        found: bool,
    },
}

/// Canvas that records requests instead of drawing them.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    layer: Option<Layer>,
    layers: Vec<Layer>,
    calls: Vec<(Layer, DrawCall)>,
    images: Vec<String>,
}

impl RecordingCanvas {
    /// A canvas where no image is loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// A canvas that reports these image keys as loaded.
    pub fn with_images(keys: &[&str]) -> Self {
        Self {
            images: keys.iter().map(|k| (*k).to_string()).collect(),
            ..Self::default()
        }
    }

    /// Layers in the order they were begun.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Every request with the layer it was submitted to.
    pub fn calls(&self) -> &[(Layer, DrawCall)] {
        &self.calls
    }

    /// Every text request, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|(_, call)| match call {
                DrawCall::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether some text request contains `needle`.
    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }

    /// Forget everything recorded.
    pub fn clear(&mut self) {
        self.layer = None;
        self.layers.clear();
        self.calls.clear();
    }

    fn record(&mut self, call: DrawCall) {
        let layer = self.layer.unwrap_or(Layer::Background);
        self.calls.push((layer, call));
    }
}

impl Canvas for RecordingCanvas {
    fn begin_layer(&mut self, layer: Layer) {
        self.layer = Some(layer);
        self.layers.push(layer);
    }

    fn fill(&mut self, color: Color) {
        self.record(DrawCall::Fill(color));
    }

    fn rect(&mut self, rect: Rect, color: Color) {
        self.record(DrawCall::Rect(rect, color));
    }

    fn rect_outline(&mut self, rect: Rect, _thickness: f32, color: Color) {
        self.record(DrawCall::RectOutline(rect, color));
    }

    fn circle(&mut self, x: f32, y: f32, radius: f32, _color: Color) {
        self.record(DrawCall::Circle {
            center: (x, y),
            radius,
        });
    }

    fn line(&mut self, _from: (f32, f32), _to: (f32, f32), _thickness: f32, _color: Color) {
        self.record(DrawCall::Line);
    }

    fn text(&mut self, text: &str, _x: f32, _y: f32, _size: f32, _color: Color) {
        self.record(DrawCall::Text(text.to_string()));
    }

    fn measure(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * 0.5
    }

    fn image(&mut self, key: &str, _rect: Rect, _tint: Color) -> bool {
        let found = self.images.iter().any(|k| k == key);
        self.record(DrawCall::Image {
            key: key.to_string(),
            found,
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::palette;

    #[test]
    fn layers_sort_back_to_front() {
        assert!(Layer::Background < Layer::Particles);
        assert!(Layer::Player < Layer::Lighting);
        assert!(Layer::Glitch < Layer::Popups);
        assert!(Layer::Map < Layer::Hud);
        assert!(Layer::Hud < Layer::Jumpscare);
    }

    #[test]
    fn missing_image_falls_back_to_placeholder() {
        let mut canvas = RecordingCanvas::with_images(&["terminal"]);
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        canvas.image_or_placeholder(Some("terminal"), rect, palette::WHITE, palette::DARK_PURPLE);
        canvas.image_or_placeholder(Some("door_locked"), rect, palette::WHITE, palette::DARK_PURPLE);
        canvas.image_or_placeholder(None, rect, palette::WHITE, palette::DARK_PURPLE);

        let calls: Vec<&DrawCall> = canvas.calls().iter().map(|(_, c)| c).collect();
        assert_eq!(calls.len(), 4);
        assert!(matches!(calls[0], DrawCall::Image { found: true, .. }));
        assert!(matches!(calls[1], DrawCall::Image { found: false, .. }));
        assert!(matches!(calls[2], DrawCall::Rect(_, _)));
        assert!(matches!(calls[3], DrawCall::Rect(_, _)));
    }

    #[test]
    fn centered_text_uses_measure() {
        let mut canvas = RecordingCanvas::new();
        canvas.begin_layer(Layer::Hud);
        canvas.text_centered("abcd", 100.0, 0.0, 10.0, palette::WHITE);
        assert_eq!(canvas.texts(), vec!["abcd"]);
        assert_eq!(canvas.calls()[0].0, Layer::Hud);
        assert!((canvas.measure("abcd", 10.0) - 20.0).abs() < f32::EPSILON);
    }
}
