//! Opening monologue, typed out line by line.

use mf_core::{Cue, StoryLine};
use mf_terminal::Typewriter;
use mf_terminal::console::wrap_text;

use super::{Screen, ScreenId, Transition};
use crate::app::AppContext;
use crate::input::FrameInput;
use crate::render::{Canvas, Layer};
use crate::theme::{CANVAS_H, CANVAS_W, palette, text_size};

/// Delay between revealed characters.
pub const STORY_CHAR_MS: u64 = 65;
/// Pause after each completed line.
pub const LINE_PAUSE_MS: u64 = 500;
/// Wrap width for story text, in characters.
const STORY_COLUMNS: usize = 64;

/// The opening monologue.
pub struct StoryScreen {
    lines: Vec<StoryLine>,
    index: usize,
    typewriter: Typewriter,
    shown: Vec<String>,
    pause_until: Option<u64>,
    last_audio: Option<String>,
    last_ms: u64,
}

impl Default for StoryScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl StoryScreen {
    /// Create a new story screen.
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            index: 0,
            typewriter: Typewriter::new(STORY_CHAR_MS),
            shown: Vec::new(),
            pause_until: None,
            last_audio: None,
            last_ms: 0,
        }
    }

    fn start_line(&mut self, ctx: &mut AppContext) {
        let Some(line) = self.lines.get(self.index) else {
            return;
        };
        self.typewriter.push(line.text.clone());
        if !line.text.is_empty()
            && let Some(audio) = &line.audio
            && self.last_audio.as_ref() != Some(audio)
        {
            ctx.cues.push(Cue::sfx(audio.clone()));
            self.last_audio = Some(audio.clone());
        }
    }
}

impl Screen for StoryScreen {
    fn on_enter(&mut self, ctx: &mut AppContext) {
        self.lines = ctx
            .campaign
            .story
            .iter()
            .flat_map(|line| {
                wrap_text(&line.text, STORY_COLUMNS)
                    .into_iter()
                    .map(move |text| StoryLine {
                        text,
                        audio: line.audio.clone(),
                    })
            })
            .collect();
        self.index = 0;
        self.shown.clear();
        self.typewriter.clear();
        self.pause_until = None;
        self.last_audio = None;
        self.last_ms = ctx.now();
        self.start_line(ctx);
    }

    fn handle_input(&mut self, ctx: &mut AppContext, input: &FrameInput) -> Transition {
        if !input.events.iter().any(|e| e.is_keypress()) {
            return Transition::None;
        }
        if self.typewriter.is_busy() {
            self.shown.extend(self.typewriter.flush());
            self.pause_until = Some(ctx.now() + LINE_PAUSE_MS);
            return Transition::None;
        }
        Transition::To(ScreenId::Menu)
    }

    fn update(&mut self, ctx: &mut AppContext, _input: &FrameInput) -> Transition {
        let now = ctx.now();
        let elapsed = now.saturating_sub(self.last_ms);
        self.last_ms = now;

        if let Some(until) = self.pause_until {
            if now < until {
                return Transition::None;
            }
            self.pause_until = None;
            self.index += 1;
            if self.index >= self.lines.len() {
                return Transition::To(ScreenId::Menu);
            }
            self.start_line(ctx);
            return Transition::None;
        }

        if self.lines.is_empty() {
            return Transition::To(ScreenId::Menu);
        }
        let finished = self.typewriter.advance(elapsed);
        if !finished.is_empty() {
            self.shown.extend(finished);
            self.pause_until = Some(now + LINE_PAUSE_MS);
        }
        Transition::None
    }

    fn draw(&self, _ctx: &AppContext, canvas: &mut dyn Canvas) {
        canvas.begin_layer(Layer::Background);
        canvas.fill(palette::BLACK);

        canvas.begin_layer(Layer::Hud);
        let size = text_size::STORY;
        let mut y = 100.0;
        // Keep the newest lines on screen
        let max_lines = ((CANVAS_H - 200.0) / 40.0) as usize;
        let skip = (self.shown.len() + 1).saturating_sub(max_lines);
        for line in self.shown.iter().skip(skip) {
            canvas.text_centered(line, CANVAS_W / 2.0, y, size, palette::WHITE);
            y += 40.0;
        }
        if let Some(partial) = self.typewriter.partial() {
            canvas.text_centered(partial, CANVAS_W / 2.0, y, size, palette::WHITE);
        }

        canvas.text_centered(
            "> Press any key to speed up / skip...",
            CANVAS_W / 2.0,
            CANVAS_H - 40.0 - text_size::UI,
            text_size::UI,
            palette::AMBER,
        );
    }
}
