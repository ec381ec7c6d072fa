//! Main menu with ambient glitches.

use mf_core::{Cue, Rect};
use mf_simulation::effects::Effects;
use rand::Rng;

use super::{Screen, ScreenId, Transition};
use crate::app::AppContext;
use crate::input::{FrameInput, InputEvent, Key};
use crate::render::{Canvas, Layer};
use crate::screen::game::draw_glitch;
use crate::theme::{CANVAS_H, CANVAS_W, palette, text_size, with_alpha};
use crate::widget::button::Button;

/// Project page announced by "> Source".
pub const SOURCE_URL: &str = "https://github.com/rohankishore/Mindfall";

/// Menu entries, top to bottom.
pub const ENTRIES: [&str; 5] = [
    "> Initiate Connection",
    "> Instructions",
    "> Settings",
    "> Source",
    "> Disconnect",
];

const FADE_STEP: u8 = 5;
const FIRST_GLITCH_MS: u64 = 3000;

/// The main menu.
pub struct MenuScreen {
    buttons: Vec<Button>,
    selected: Option<usize>,
    hovered: Option<usize>,
    effects: Effects,
    next_glitch_at: u64,
    fade_alpha: u8,
}

impl Default for MenuScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuScreen {
    /// Create a new menu screen.
    pub fn new() -> Self {
        let buttons = ENTRIES
            .iter()
            .enumerate()
            .map(|(i, label)| {
                Button::new(*label, CANVAS_W / 2.0, 300.0 + 70.0 * i as f32, text_size::BUTTON)
            })
            .collect();
        Self {
            buttons,
            selected: None,
            hovered: None,
            effects: Effects::new(CANVAS_W, CANVAS_H),
            next_glitch_at: 0,
            fade_alpha: u8::MAX,
        }
    }

    /// Current black overlay alpha.
    pub fn fade_alpha(&self) -> u8 {
        self.fade_alpha
    }

    fn activate(&mut self, index: usize, ctx: &mut AppContext) -> Transition {
        match index {
            0 => match ctx.start_new_game() {
                Ok(()) => Transition::To(ScreenId::LevelIntro),
                Err(e) => {
                    tracing::warn!("could not start a new game: {e}");
                    Transition::None
                }
            },
            1 => Transition::To(ScreenId::Instructions),
            2 => Transition::To(ScreenId::Settings),
            3 => {
                tracing::info!(url = SOURCE_URL, "source code");
                Transition::None
            }
            4 => Transition::Quit,
            _ => Transition::None,
        }
    }

    fn select_chapter(ctx: &mut AppContext, index: usize) -> Transition {
        match ctx.select_chapter(index) {
            Ok(()) => Transition::To(ScreenId::LevelIntro),
            Err(e) => {
                tracing::warn!(index, "chapter select ignored: {e}");
                Transition::None
            }
        }
    }
}

impl Screen for MenuScreen {
    fn on_enter(&mut self, ctx: &mut AppContext) {
        self.fade_alpha = u8::MAX;
        self.next_glitch_at = ctx.now() + FIRST_GLITCH_MS;
        ctx.cues.push(Cue::music("menu_music", 1000));
    }

    fn on_exit(&mut self, ctx: &mut AppContext) {
        ctx.cues.push(Cue::stop("menu_music", 500));
    }

    fn handle_input(&mut self, ctx: &mut AppContext, input: &FrameInput) -> Transition {
        let (mx, my) = input.mouse;
        self.hovered = self.buttons.iter().position(|b| b.contains(mx, my));

        for event in &input.events {
            let transition = match *event {
                InputEvent::Click { x, y } => {
                    match self.buttons.iter().position(|b| b.contains(x, y)) {
                        Some(i) => self.activate(i, ctx),
                        None => Transition::None,
                    }
                }
                InputEvent::Key(Key::Up) => {
                    let last = self.buttons.len() - 1;
                    self.selected = Some(self.selected.map_or(last, |i| i.checked_sub(1).unwrap_or(last)));
                    Transition::None
                }
                InputEvent::Key(Key::Down) => {
                    self.selected = Some(self.selected.map_or(0, |i| (i + 1) % self.buttons.len()));
                    Transition::None
                }
                InputEvent::Key(Key::Enter) => match self.selected {
                    Some(i) => self.activate(i, ctx),
                    None => Transition::None,
                },
                InputEvent::Char(c @ '1'..='5') => {
                    let index = c as usize - '1' as usize;
                    Self::select_chapter(ctx, index)
                }
                _ => Transition::None,
            };
            if transition != Transition::None {
                return transition;
            }
        }
        Transition::None
    }

    fn update(&mut self, ctx: &mut AppContext, _input: &FrameInput) -> Transition {
        let now = ctx.now();
        if now > self.next_glitch_at {
            let duration = ctx.rng.random_range(100..=400);
            let intensity = ctx.rng.random_range(5..=15);
            self.effects.trigger_glitch(now, duration, intensity);
            if ctx.rng.random_bool(0.2) {
                let burst = ctx.rng.random_range(50..=200);
                self.effects.static_burst(now, burst, 100);
            }
            self.next_glitch_at = now + ctx.rng.random_range(2000..=5000);
        }
        self.effects.glitch.update(now, &mut ctx.rng);
        for cue in self.effects.cues.drain() {
            ctx.cues.push(cue);
        }
        self.fade_alpha = self.fade_alpha.saturating_sub(FADE_STEP);
        Transition::None
    }

    fn draw(&self, ctx: &AppContext, canvas: &mut dyn Canvas) {
        canvas.begin_layer(Layer::Background);
        canvas.fill(palette::BLACK);
        canvas.image(
            "background",
            Rect::new(0.0, 0.0, CANVAS_W, CANVAS_H),
            palette::WHITE,
        );

        canvas.begin_layer(Layer::Hud);
        canvas.text_centered(
            "// Mindfall",
            CANVAS_W / 2.0,
            150.0 - text_size::TITLE / 2.0,
            text_size::TITLE,
            palette::GREEN,
        );
        for (i, button) in self.buttons.iter().enumerate() {
            let lit = self.hovered == Some(i) || self.selected == Some(i);
            button.draw(canvas, lit);
        }

        canvas.begin_layer(Layer::Glitch);
        draw_glitch(&self.effects.glitch, ctx.now(), canvas);

        if self.fade_alpha > 0 {
            canvas.begin_layer(Layer::Fade);
            canvas.fill(with_alpha(palette::BLACK, self.fade_alpha));
        }
    }
}
