//! Visual theme: color palette, text sizes, and virtual canvas scaling.

use macroquad::prelude::*;

/// Virtual canvas width in pixels. The window scales this up or down.
pub const CANVAS_W: f32 = 1280.0;
/// Virtual canvas height in pixels.
pub const CANVAS_H: f32 = 720.0;

/// Text sizes in canvas pixels.
pub mod text_size {
    /// HUD and body text.
    pub const UI: f32 = 24.0;
    /// Popup text.
    pub const POPUP: f32 = 28.0;
    /// Story and intro lines.
    pub const STORY: f32 = 28.0;
    /// Section headers and the win epilogue.
    pub const MESSAGE: f32 = 32.0;
    /// Menu buttons.
    pub const BUTTON: f32 = 48.0;
    /// Chapter titles.
    pub const LEVEL_TITLE: f32 = 64.0;
    /// The game title.
    pub const TITLE: f32 = 96.0;
    /// Terminal console text.
    pub const TERMINAL: f32 = 20.0;
}

/// Palette of the quarantined mind.
pub mod palette {
    use macroquad::prelude::Color;

    /// Black background.
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    /// Primary text.
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    /// Terminal phosphor.
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.275, 1.0);
    /// Scanlines behind the terminal.
    pub const DARK_GREEN: Color = Color::new(0.0, 0.1, 0.03, 1.0);
    /// Player and map highlights.
    pub const CYAN: Color = Color::new(0.0, 1.0, 1.0, 1.0);
    /// Hover and selection.
    pub const AMBER: Color = Color::new(1.0, 0.69, 0.0, 1.0);
    /// Warnings and the epilogue.
    pub const RED: Color = Color::new(1.0, 0.2, 0.2, 1.0);
    /// Hunters.
    pub const DARK_RED: Color = Color::new(0.55, 0.0, 0.0, 1.0);
    /// World floor.
    pub const DARK_GRAY: Color = Color::new(0.12, 0.12, 0.14, 1.0);
    /// Floor flicker.
    pub const DARK_PURPLE: Color = Color::new(0.16, 0.08, 0.2, 1.0);
    /// Inactive controls and captions.
    pub const MID_GRAY: Color = Color::new(0.59, 0.59, 0.59, 1.0);
    /// Minimap background.
    pub const MAP_GRAY: Color = Color::new(0.16, 0.16, 0.16, 0.78);
    /// Minimap walls.
    pub const MAP_WALL: Color = Color::new(0.4, 0.4, 0.45, 1.0);
    /// Wall fill.
    pub const WALL: Color = Color::new(0.2, 0.2, 0.24, 1.0);
}

/// Build a color from 8-bit channels.
pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
    Color::from_rgba(r, g, b, a)
}

/// A palette color with a new alpha.
pub fn with_alpha(color: Color, alpha: u8) -> Color {
    Color::new(color.r, color.g, color.b, f32::from(alpha) / 255.0)
}

fn viewport() -> (f32, f32, f32) {
    let scale = (screen_width() / CANVAS_W).min(screen_height() / CANVAS_H);
    let offset_x = (screen_width() - CANVAS_W * scale) / 2.0;
    let offset_y = (screen_height() - CANVAS_H * scale) / 2.0;
    (scale, offset_x, offset_y)
}

/// Set up a `Camera2D` that letterboxes the virtual canvas in the window.
pub fn setup_virtual_canvas() {
    let (scale, offset_x, offset_y) = viewport();
    set_camera(&Camera2D {
        zoom: vec2(2.0 / CANVAS_W, 2.0 / CANVAS_H),
        target: vec2(CANVAS_W / 2.0, CANVAS_H / 2.0),
        viewport: Some((
            offset_x as i32,
            offset_y as i32,
            (CANVAS_W * scale) as i32,
            (CANVAS_H * scale) as i32,
        )),
        ..Default::default()
    });
}

/// Convert the window mouse position to virtual canvas coordinates.
pub fn mouse_canvas_position() -> (f32, f32) {
    let (mx, my) = mouse_position();
    let (scale, offset_x, offset_y) = viewport();
    ((mx - offset_x) / scale, (my - offset_y) / scale)
}
