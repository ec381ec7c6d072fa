//! The main terminal console.

use mf_terminal::{ConsoleKey, ConsoleRequest, Phase, TerminalConsole, prompt_for};

use super::{Screen, ScreenId, Transition};
use crate::app::AppContext;
use crate::input::{FrameInput, InputEvent, Key};
use crate::render::{Canvas, Layer};
use crate::theme::{CANVAS_H, CANVAS_W, palette, text_size, with_alpha};

const MARGIN: f32 = 40.0;
const LINE_HEIGHT: f32 = 25.0;
const CURSOR_BLINK_MS: u64 = 500;

fn console_key(event: &InputEvent) -> Option<ConsoleKey> {
    match *event {
        InputEvent::Char(c) => Some(ConsoleKey::Char(c)),
        InputEvent::Key(Key::Backspace) => Some(ConsoleKey::Backspace),
        InputEvent::Key(Key::Enter) => Some(ConsoleKey::Enter),
        InputEvent::Key(Key::Up) => Some(ConsoleKey::Up),
        InputEvent::Key(Key::Down) => Some(ConsoleKey::Down),
        InputEvent::Key(Key::Escape) => Some(ConsoleKey::Escape),
        _ => None,
    }
}

fn glow_line(canvas: &mut dyn Canvas, text: &str, y: f32) {
    let size = text_size::TERMINAL;
    canvas.text(text, MARGIN + 1.0, y + 1.0, size, with_alpha(palette::GREEN, 60));
    canvas.text(text, MARGIN, y, size, palette::GREEN);
}

/// Screen wrapper around a [`TerminalConsole`].
pub struct TerminalScreen {
    console: TerminalConsole,
}

impl Default for TerminalScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalScreen {
    /// Create a new terminal screen.
    pub fn new() -> Self {
        Self {
            console: TerminalConsole::new(),
        }
    }

    /// The wrapped console.
    pub fn console(&self) -> &TerminalConsole {
        &self.console
    }
}

impl Screen for TerminalScreen {
    fn on_enter(&mut self, ctx: &mut AppContext) {
        match ctx.scene.as_mut() {
            Some(scene) => self.console.enter(scene, &ctx.clock),
            None => tracing::warn!("terminal opened without a loaded chapter"),
        }
    }

    fn on_exit(&mut self, ctx: &mut AppContext) {
        if let Some(scene) = ctx.scene.as_mut() {
            self.console.exit(scene);
        }
    }

    fn handle_input(&mut self, ctx: &mut AppContext, input: &FrameInput) -> Transition {
        let Some(scene) = ctx.scene.as_mut() else {
            return Transition::To(ScreenId::Menu);
        };
        for key in input.events.iter().filter_map(console_key) {
            self.console.handle_key(key, scene, &ctx.clock);
        }
        Transition::None
    }

    fn update(&mut self, ctx: &mut AppContext, _input: &FrameInput) -> Transition {
        let Some(scene) = ctx.scene.as_mut() else {
            return Transition::To(ScreenId::Menu);
        };
        match self.console.update(scene, &ctx.clock) {
            Some(ConsoleRequest::ReturnToGame) => Transition::To(ScreenId::Game),
            None => Transition::None,
        }
    }

    fn draw(&self, ctx: &AppContext, canvas: &mut dyn Canvas) {
        canvas.begin_layer(Layer::Background);
        canvas.fill(palette::BLACK);
        let mut y = 0.0;
        while y < CANVAS_H {
            canvas.line((0.0, y), (CANVAS_W, y), 1.0, palette::DARK_GREEN);
            y += 4.0;
        }

        canvas.begin_layer(Layer::Hud);
        let size = text_size::TERMINAL;
        let visible = ((CANVAS_H - 2.0 * MARGIN) / LINE_HEIGHT) as usize;
        let partial = self.console.partial_line();
        let show_prompt = self.console.phase() == Phase::Active && !self.console.is_typing();
        let reserved = usize::from(partial.is_some()) + usize::from(show_prompt);
        let lines = self.console.lines();
        let skip = (lines.len() + reserved).saturating_sub(visible);

        let mut y = MARGIN;
        for text in lines.iter().skip(skip) {
            glow_line(canvas, text, y);
            y += LINE_HEIGHT;
        }
        if let Some(text) = partial {
            glow_line(canvas, text, y);
            y += LINE_HEIGHT;
        }
        if show_prompt {
            let privilege = ctx.scene.as_ref().map_or(0, |s| s.ledger().privilege());
            let prompt = format!("{}{}", prompt_for(privilege), self.console.input());
            glow_line(canvas, &prompt, y);
            if (ctx.now() / CURSOR_BLINK_MS) % 2 == 0 {
                let x = MARGIN + canvas.measure(&prompt, size);
                canvas.text("_", x, y, size, palette::GREEN);
            }
        }

        let alpha = self.console.fade_alpha();
        if alpha > 0 {
            canvas.begin_layer(Layer::Fade);
            canvas.fill(with_alpha(palette::BLACK, alpha));
        }
    }
}
