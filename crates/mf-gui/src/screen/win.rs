//! Campaign epilogue.

use super::{Screen, ScreenId, Transition};
use crate::app::AppContext;
use crate::input::{FrameInput, InputEvent, Key};
use crate::render::{Canvas, Layer};
use crate::theme::{CANVAS_H, CANVAS_W, palette, text_size};

/// The win screen.
pub struct WinScreen;

impl Default for WinScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl WinScreen {
    /// Create a new win screen.
    pub fn new() -> Self {
        Self
    }
}

impl Screen for WinScreen {
    fn on_enter(&mut self, _ctx: &mut AppContext) {
        tracing::info!("memory restored, campaign complete");
    }

    fn handle_input(&mut self, _ctx: &mut AppContext, input: &FrameInput) -> Transition {
        if input.events.contains(&InputEvent::Key(Key::Escape)) {
            Transition::To(ScreenId::Menu)
        } else {
            Transition::None
        }
    }

    fn draw(&self, ctx: &AppContext, canvas: &mut dyn Canvas) {
        canvas.begin_layer(Layer::Background);
        canvas.fill(palette::BLACK);

        canvas.begin_layer(Layer::Hud);
        let mut y = CANVAS_H / 2.0 - 200.0;
        for line in &ctx.campaign.win {
            canvas.text_centered(line, CANVAS_W / 2.0, y, text_size::MESSAGE, palette::RED);
            y += 40.0;
        }
        canvas.text_centered(
            "> Press ESC to disconnect from the memory.",
            CANVAS_W / 2.0,
            CANVAS_H - 60.0,
            text_size::UI,
            palette::AMBER,
        );
    }
}
