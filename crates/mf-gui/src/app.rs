//! Application state shared across all screens, and the state machine
//! that drives them.

use std::path::PathBuf;
use std::sync::Arc;

use mf_core::{Campaign, Cue, CueQueue};
use mf_simulation::{Advance, LevelManager, Scene, SceneOptions, SimClock, SimConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::audio::{AudioBackend, Mixer};
use crate::error::GuiResult;
use crate::input::{FrameInput, InputEvent};
use crate::narration::{Narrator, SpeechBackend};
use crate::render::Canvas;
use crate::screen::{Screen, ScreenId, Transition, make_screen};
use crate::settings::Settings;

/// Shared application state accessible by all screens.
pub struct AppContext {
    /// Player settings.
    pub settings: Settings,
    /// Where settings are saved.
    pub settings_path: PathBuf,
    /// Story, instructions, epilogue and chapters.
    pub campaign: Campaign,
    /// Chapter progression.
    pub levels: LevelManager,
    /// Simulation tuning.
    pub config: SimConfig,
    /// The tick clock. Advances once per simulation step on every screen.
    pub clock: SimClock,
    /// Cues raised by screens outside a scene.
    pub cues: CueQueue,
    /// The live chapter, once one has been started.
    pub scene: Option<Scene>,
    /// Randomness for menu effects.
    pub rng: StdRng,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl AppContext {
    /// Context with no chapter loaded yet.
    pub fn new(
        settings: Settings,
        settings_path: PathBuf,
        campaign: Campaign,
        config: SimConfig,
    ) -> Self {
        Self {
            levels: LevelManager::new(&campaign),
            clock: SimClock::new(config.tick_rate),
            rng: StdRng::seed_from_u64(config.seed),
            settings,
            settings_path,
            campaign,
            config,
            cues: CueQueue::new(),
            scene: None,
            should_quit: false,
        }
    }

    /// Current time on the tick clock (ms).
    pub fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Scene options derived from the settings.
    pub fn scene_options(&self) -> SceneOptions {
        SceneOptions {
            show_map: self.settings.show_map_on_start,
            digital_rain: self.settings.enable_digital_rain,
        }
    }

    /// Build the live scene for the current chapter.
    pub fn load_scene(&mut self) -> GuiResult<()> {
        let scene = self
            .levels
            .build_scene(&self.config, self.scene_options(), &self.clock)?;
        self.scene = Some(scene);
        Ok(())
    }

    /// Start over from the first chapter.
    pub fn start_new_game(&mut self) -> GuiResult<()> {
        self.levels.start_new_game()?;
        self.load_scene()
    }

    /// Jump to chapter `index` (zero-based).
    pub fn select_chapter(&mut self, index: usize) -> GuiResult<()> {
        self.levels.load_specific_level(index)?;
        self.load_scene()
    }

    /// Move past the current chapter, loading the next one if there is one.
    pub fn advance_chapter(&mut self) -> GuiResult<Advance> {
        let advance = self.levels.next_level();
        if let Advance::Load(_) = advance {
            self.load_scene()?;
        }
        Ok(advance)
    }

    /// Persist the settings. Failures are only logged.
    pub fn save_settings(&self) {
        if let Err(e) = self.settings.save(&self.settings_path) {
            tracing::warn!("could not save settings: {e}");
        }
    }
}

/// The state machine: one active screen, the mixer and the narrator.
pub struct App {
    ctx: AppContext,
    screen: Box<dyn Screen>,
    current: ScreenId,
    entered: Vec<ScreenId>,
    mixer: Mixer,
    narrator: Narrator,
    last_ms: u64,
}

impl App {
    /// Start on the story screen.
    pub fn new(
        ctx: AppContext,
        audio: Box<dyn AudioBackend>,
        speech: Arc<dyn SpeechBackend>,
    ) -> Self {
        let last_ms = ctx.now();
        let mut app = Self {
            ctx,
            screen: make_screen(ScreenId::Story),
            current: ScreenId::Story,
            entered: vec![ScreenId::Story],
            mixer: Mixer::new(audio),
            narrator: Narrator::new(speech),
            last_ms,
        };
        app.screen.on_enter(&mut app.ctx);
        app.dispatch_cues();
        app
    }

    /// The active screen.
    pub fn current(&self) -> ScreenId {
        self.current
    }

    /// Every screen entered so far, in order, starting with the story.
    pub fn entered(&self) -> &[ScreenId] {
        &self.entered
    }

    /// Shared state.
    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Shared state, mutably.
    pub fn context_mut(&mut self) -> &mut AppContext {
        &mut self.ctx
    }

    /// The audio mixer.
    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    /// Whether the main loop should stop.
    pub fn should_quit(&self) -> bool {
        self.ctx.should_quit
    }

    /// Hand this frame's events to the active screen.
    pub fn handle_input(&mut self, input: &FrameInput) {
        if input.events.contains(&InputEvent::Quit) {
            tracing::info!("quit requested by the window");
            self.ctx.should_quit = true;
            return;
        }
        let transition = self.screen.handle_input(&mut self.ctx, input);
        self.apply(transition);
        self.dispatch_cues();
    }

    /// Advance one simulation tick.
    pub fn tick(&mut self, input: &FrameInput) {
        self.ctx.clock.advance();
        let transition = self.screen.update(&mut self.ctx, input);
        self.apply(transition);
        self.dispatch_cues();

        let now = self.ctx.now();
        self.mixer
            .update(now.saturating_sub(self.last_ms), &self.ctx.settings);
        self.last_ms = now;
    }

    /// Submit the active screen's draw requests.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        self.screen.draw(&self.ctx, canvas);
    }

    /// Leave the active screen for `id`.
    pub fn switch(&mut self, id: ScreenId) {
        tracing::debug!(from = ?self.current, to = ?id, "state transition");
        self.screen.on_exit(&mut self.ctx);
        self.dispatch_cues();

        self.screen = make_screen(id);
        self.current = id;
        self.entered.push(id);
        self.screen.on_enter(&mut self.ctx);
    }

    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::None => {}
            Transition::To(id) => self.switch(id),
            Transition::Quit => {
                tracing::info!("quit requested");
                self.ctx.should_quit = true;
            }
        }
    }

    fn dispatch_cues(&mut self) {
        let mut cues = self.ctx.cues.drain();
        if let Some(scene) = &mut self.ctx.scene {
            cues.extend(scene.sector.effects.cues.drain());
        }
        if cues.is_empty() {
            return;
        }

        self.narrator
            .set_enabled(self.ctx.settings.enable_voice_narration);
        for cue in &cues {
            match cue {
                Cue::Speak(text) => {
                    let _ = self.narrator.speak(text);
                }
                sound => self.mixer.handle(sound, &self.ctx.settings),
            }
        }
    }
}
