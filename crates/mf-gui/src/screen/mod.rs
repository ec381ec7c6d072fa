//! Screen management: trait definition, screen identifiers, and transitions.

pub mod game;
pub mod instructions;
pub mod level_intro;
pub mod menu;
pub mod settings;
pub mod story;
pub mod terminal;
pub mod win;

use crate::app::AppContext;
use crate::input::FrameInput;
use crate::render::Canvas;

/// Identifies which screen to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    /// Opening monologue.
    Story,
    /// Main menu.
    Menu,
    /// Controls and objectives.
    Instructions,
    /// Volume and accessibility options.
    Settings,
    /// Chapter title card.
    LevelIntro,
    /// Exploring a sector.
    Game,
    /// The main terminal console.
    Terminal,
    /// Campaign epilogue.
    Win,
}

/// A transition between screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stay on the current screen.
    None,
    /// Leave for another screen.
    To(ScreenId),
    /// Close the application.
    Quit,
}

/// Lifecycle every screen implements.
///
/// The application calls `on_exit` on the outgoing screen before
/// `on_enter` on the incoming one. `handle_input` runs once per frame,
/// `update` once per simulation tick.
pub trait Screen {
    /// Reset state and start ambient audio.
    fn on_enter(&mut self, _ctx: &mut AppContext) {}
    /// React to this frame's discrete events.
    fn handle_input(&mut self, ctx: &mut AppContext, input: &FrameInput) -> Transition;
    /// Advance one tick. Held keys are in `input.held`.
    fn update(&mut self, _ctx: &mut AppContext, _input: &FrameInput) -> Transition {
        Transition::None
    }
    /// Submit draw requests.
    fn draw(&self, ctx: &AppContext, canvas: &mut dyn Canvas);
    /// Stop screen-specific audio.
    fn on_exit(&mut self, _ctx: &mut AppContext) {}
}

/// Create a screen instance for a given screen id.
pub fn make_screen(id: ScreenId) -> Box<dyn Screen> {
    match id {
        ScreenId::Story => Box::new(story::StoryScreen::new()),
        ScreenId::Menu => Box::new(menu::MenuScreen::new()),
        ScreenId::Instructions => Box::new(instructions::InstructionsScreen::new()),
        ScreenId::Settings => Box::new(settings::SettingsScreen::new()),
        ScreenId::LevelIntro => Box::new(level_intro::LevelIntroScreen::new()),
        ScreenId::Game => Box::new(game::GameScreen::new()),
        ScreenId::Terminal => Box::new(terminal::TerminalScreen::new()),
        ScreenId::Win => Box::new(win::WinScreen::new()),
    }
}
