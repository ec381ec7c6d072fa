//! Chapter title card with the intro typed out.

use mf_core::Cue;
use mf_terminal::Typewriter;
use mf_terminal::console::wrap_text;

use super::{Screen, ScreenId, Transition};
use crate::app::AppContext;
use crate::input::{FrameInput, InputEvent};
use crate::render::{Canvas, Layer};
use crate::theme::{CANVAS_H, CANVAS_W, palette, text_size};

/// Delay between revealed intro characters.
pub const INTRO_CHAR_MS: u64 = 50;
const INTRO_COLUMNS: usize = 72;
const LINE_SPACING: f32 = 40.0;

/// The level intro card.
pub struct LevelIntroScreen {
    title: String,
    objectives: Vec<String>,
    typewriter: Typewriter,
    shown: Vec<String>,
    chars: Vec<char>,
    revealed: usize,
    complete: bool,
    last_ms: u64,
}

impl Default for LevelIntroScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelIntroScreen {
    /// Create a new level intro screen.
    pub fn new() -> Self {
        Self {
            title: String::new(),
            objectives: Vec::new(),
            typewriter: Typewriter::new(INTRO_CHAR_MS),
            shown: Vec::new(),
            chars: Vec::new(),
            revealed: 0,
            complete: false,
            last_ms: 0,
        }
    }

    /// Whether the intro has finished typing.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    fn revealed_now(&self) -> usize {
        let done: usize = self.shown.iter().map(|l| l.chars().count()).sum();
        done + self.typewriter.partial().map_or(0, |p| p.chars().count())
    }

    fn complete_text(&mut self) {
        self.shown.extend(self.typewriter.flush());
        self.revealed = self.chars.len();
        self.complete = true;
    }
}

impl Screen for LevelIntroScreen {
    fn on_enter(&mut self, ctx: &mut AppContext) {
        self.typewriter.clear();
        self.shown.clear();
        self.revealed = 0;
        self.complete = false;
        self.last_ms = ctx.now();

        let Some(scene) = ctx.scene.as_ref() else {
            tracing::warn!("level intro without a loaded chapter");
            self.complete = true;
            return;
        };
        let level = scene.level();
        self.title = level.title.clone();
        self.objectives = level.objectives.clone();
        let lines = wrap_text(&level.intro, INTRO_COLUMNS);
        self.chars = lines.iter().flat_map(|l| l.chars()).collect();
        for line in lines {
            self.typewriter.push(line);
        }
        tracing::info!(chapter = scene.chapter(), title = %self.title, "level intro");
    }

    fn handle_input(&mut self, ctx: &mut AppContext, input: &FrameInput) -> Transition {
        let pressed = input
            .events
            .iter()
            .any(|e| e.is_keypress() || matches!(e, InputEvent::Click { .. }));
        if !pressed {
            return Transition::None;
        }
        if !self.complete {
            self.complete_text();
            return Transition::None;
        }
        if ctx.scene.is_some() {
            Transition::To(ScreenId::Game)
        } else {
            Transition::To(ScreenId::Menu)
        }
    }

    fn update(&mut self, ctx: &mut AppContext, _input: &FrameInput) -> Transition {
        let now = ctx.now();
        let elapsed = now.saturating_sub(self.last_ms);
        self.last_ms = now;
        if self.complete {
            return Transition::None;
        }

        let finished = self.typewriter.advance(elapsed);
        self.shown.extend(finished);
        let revealed = self.revealed_now();
        for c in &self.chars[self.revealed.min(self.chars.len())..revealed.min(self.chars.len())] {
            if !c.is_whitespace() {
                ctx.cues.push(Cue::sfx("key_press"));
            }
        }
        self.revealed = revealed;
        if !self.typewriter.is_busy() {
            self.complete = true;
        }
        Transition::None
    }

    fn draw(&self, _ctx: &AppContext, canvas: &mut dyn Canvas) {
        canvas.begin_layer(Layer::Background);
        canvas.fill(palette::BLACK);

        canvas.begin_layer(Layer::Hud);
        let cx = CANVAS_W / 2.0;
        canvas.text_centered(
            &self.title,
            cx,
            CANVAS_H * 0.2 - text_size::LEVEL_TITLE / 2.0,
            text_size::LEVEL_TITLE,
            palette::GREEN,
        );

        let size = text_size::UI;
        let mut y = CANVAS_H * 0.35;
        for line in &self.shown {
            canvas.text_centered(line, cx, y, size, palette::CYAN);
            y += LINE_SPACING;
        }
        if let Some(partial) = self.typewriter.partial() {
            canvas.text_centered(partial, cx, y, size, palette::CYAN);
        }

        if self.complete {
            y += LINE_SPACING;
            for (i, objective) in self.objectives.iter().enumerate() {
                let color = if i == 0 { palette::AMBER } else { palette::WHITE };
                canvas.text_centered(objective, cx, y, size, color);
                y += LINE_SPACING * 0.8;
            }
            canvas.text_centered(
                "> Press any key to begin...",
                cx,
                CANVAS_H - 80.0,
                size,
                palette::AMBER,
            );
        }
    }
}
