//! Controls and objectives.

use super::{Screen, ScreenId, Transition};
use crate::app::AppContext;
use crate::input::{FrameInput, InputEvent, Key};
use crate::render::{Canvas, Layer};
use crate::theme::{CANVAS_H, CANVAS_W, palette, text_size};
use crate::widget::button::Button;

/// The instructions page.
pub struct InstructionsScreen {
    back: Button,
    hovered: bool,
}

impl Default for InstructionsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl InstructionsScreen {
    /// Create a new instructions screen.
    pub fn new() -> Self {
        Self {
            back: Button::new("[ Return ]", CANVAS_W / 2.0, CANVAS_H - 80.0, text_size::BUTTON),
            hovered: false,
        }
    }
}

impl Screen for InstructionsScreen {
    fn handle_input(&mut self, _ctx: &mut AppContext, input: &FrameInput) -> Transition {
        self.hovered = self.back.contains(input.mouse.0, input.mouse.1);
        let leave = input.events.iter().any(|event| match *event {
            InputEvent::Key(Key::Escape | Key::Enter) => true,
            InputEvent::Click { x, y } => self.back.contains(x, y),
            _ => false,
        });
        if leave {
            Transition::To(ScreenId::Menu)
        } else {
            Transition::None
        }
    }

    fn draw(&self, ctx: &AppContext, canvas: &mut dyn Canvas) {
        canvas.begin_layer(Layer::Background);
        canvas.fill(palette::BLACK);

        canvas.begin_layer(Layer::Hud);
        canvas.text_centered(
            "System Protocol",
            CANVAS_W / 2.0,
            80.0 - text_size::LEVEL_TITLE / 2.0,
            text_size::LEVEL_TITLE,
            palette::GREEN,
        );
        let size = text_size::UI;
        for (i, line) in ctx.campaign.instructions.iter().enumerate() {
            canvas.text(line, 100.0, 160.0 + 30.0 * i as f32, size, palette::WHITE);
        }
        self.back.draw(canvas, self.hovered);
    }
}
