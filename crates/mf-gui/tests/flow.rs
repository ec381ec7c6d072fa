//! Headless walks through the application state machine.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use mf_core::ledger::{DOOR_UNLOCKED, POWER_RESTORED};
use mf_core::{Campaign, EntityKind};
use mf_gui::app::{App, AppContext};
use mf_gui::audio::AudioBackend;
use mf_gui::input::{FrameInput, InputEvent, Key};
use mf_gui::narration::SpeechBackend;
use mf_gui::render::RecordingCanvas;
use mf_gui::screen::ScreenId;
use mf_gui::settings::Settings;
use mf_simulation::{Advance, SimConfig};
use tempfile::TempDir;

/// Backend that has every sound and remembers what was started.
#[derive(Default)]
struct Jukebox {
    played: Rc<RefCell<Vec<String>>>,
}

impl AudioBackend for Jukebox {
    fn has(&self, _name: &str) -> bool {
        true
    }

    fn play(&mut self, name: &str, _looped: bool, _volume: f32) {
        self.played.borrow_mut().push(name.to_string());
    }

    fn stop(&mut self, _name: &str) {}

    fn set_volume(&mut self, _name: &str, _volume: f32) {}
}

struct Mute;

impl SpeechBackend for Mute {
    fn say(&self, _word: &str) {}
}

struct Harness {
    app: App,
    played: Rc<RefCell<Vec<String>>>,
    _dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.enable_voice_narration = false;
        let ctx = AppContext::new(
            settings,
            dir.path().join("settings.json"),
            Campaign::bundled().unwrap(),
            SimConfig::default().with_username(Some("tester".into())),
        );
        let jukebox = Jukebox::default();
        let played = Rc::clone(&jukebox.played);
        Self {
            app: App::new(ctx, Box::new(jukebox), Arc::new(Mute)),
            played,
            _dir: dir,
        }
    }

    fn press(&mut self, event: InputEvent) {
        self.app.handle_input(&FrameInput::from_events([event]));
    }

    fn key(&mut self, key: Key) {
        self.press(InputEvent::Key(key));
    }

    fn ticks(&mut self, n: usize) {
        for _ in 0..n {
            self.app.tick(&FrameInput::default());
        }
    }

    fn skip_story(&mut self) {
        assert_eq!(self.app.current(), ScreenId::Story);
        self.key(Key::Enter);
        self.key(Key::Enter);
        assert_eq!(self.app.current(), ScreenId::Menu);
    }

    fn start_game(&mut self) {
        self.skip_story();
        self.key(Key::Down);
        self.key(Key::Enter);
        assert_eq!(self.app.current(), ScreenId::LevelIntro);
        self.through_intro();
    }

    fn through_intro(&mut self) {
        assert_eq!(self.app.current(), ScreenId::LevelIntro);
        self.key(Key::Enter);
        self.key(Key::Enter);
        assert_eq!(self.app.current(), ScreenId::Game);
    }

    /// Leave only the interactive of the given kind and stand on it.
    fn stand_on(&mut self, wanted: fn(&EntityKind) -> bool) {
        let scene = self.app.context_mut().scene.as_mut().unwrap();
        let sector = &mut scene.sector;
        sector.interactives.retain(|e| wanted(&e.kind));
        let target = sector.interactives[0].rect;
        sector.player.rect.x = target.x;
        sector.player.rect.y = target.y;
    }

    fn count(&self, id: ScreenId) -> usize {
        self.app.entered().iter().filter(|s| **s == id).count()
    }
}

fn is_door(kind: &EntityKind) -> bool {
    matches!(kind, EntityKind::Door { .. })
}

fn is_terminal(kind: &EntityKind) -> bool {
    matches!(kind, EntityKind::Terminal)
}

#[test]
fn story_skips_to_menu_and_starts_music() {
    let mut h = Harness::new();
    h.skip_story();
    assert!(h.app.mixer().is_playing("menu_music"));
    assert!(h.played.borrow().iter().any(|n| n == "menu_music"));
}

#[test]
fn story_finishes_on_its_own() {
    let mut h = Harness::new();
    let lines = h.app.context().campaign.story.len();
    // Generous upper bound: 80 chars per line at 65 ms plus the pause.
    h.ticks(lines * 2 * 6 * 60);
    assert_eq!(h.app.current(), ScreenId::Menu);
}

#[test]
fn new_game_reaches_the_first_sector() {
    let mut h = Harness::new();
    h.start_game();
    assert_eq!(
        h.app.entered(),
        &[
            ScreenId::Story,
            ScreenId::Menu,
            ScreenId::LevelIntro,
            ScreenId::Game
        ]
    );
    let ctx = h.app.context();
    assert_eq!(ctx.scene.as_ref().map(|s| s.chapter()), Some(0));
    assert!(h.played.borrow().iter().any(|n| n == "ambient_music"));
}

#[test]
fn chapter_keys_jump_from_the_menu() {
    let mut h = Harness::new();
    h.skip_story();
    h.press(InputEvent::Char('3'));
    assert_eq!(h.app.current(), ScreenId::LevelIntro);
    assert_eq!(h.app.context().levels.current_index(), 2);
}

#[test]
fn instructions_and_settings_return_to_menu() {
    let mut h = Harness::new();
    h.skip_story();
    h.key(Key::Down);
    h.key(Key::Down);
    h.key(Key::Enter);
    assert_eq!(h.app.current(), ScreenId::Instructions);
    h.key(Key::Escape);
    assert_eq!(h.app.current(), ScreenId::Menu);

    h.key(Key::Down);
    h.key(Key::Down);
    h.key(Key::Down);
    h.key(Key::Enter);
    assert_eq!(h.app.current(), ScreenId::Settings);
    h.key(Key::Right);
    h.key(Key::Escape);
    assert_eq!(h.app.current(), ScreenId::Menu);

    let ctx = h.app.context();
    let saved = Settings::load(&ctx.settings_path).unwrap();
    assert!((saved.master_volume - 0.85).abs() < 1e-4);
}

#[test]
fn disconnect_quits() {
    let mut h = Harness::new();
    h.skip_story();
    h.key(Key::Up);
    h.key(Key::Enter);
    assert!(h.app.should_quit());
}

#[test]
fn window_close_quits_from_anywhere() {
    let mut h = Harness::new();
    h.press(InputEvent::Quit);
    assert!(h.app.should_quit());
}

#[test]
fn locked_door_does_not_advance() {
    let mut h = Harness::new();
    h.start_game();
    h.stand_on(is_door);
    h.press(InputEvent::Char('e'));
    assert_eq!(h.app.current(), ScreenId::Game);
    assert_eq!(h.app.context().levels.current_index(), 0);
}

#[test]
fn whole_campaign_ends_in_a_single_win() {
    let mut h = Harness::new();
    h.start_game();
    let chapters = h.app.context().levels.len();

    for chapter in 0..chapters {
        assert_eq!(h.app.context().levels.current_index(), chapter);
        h.ticks(5);
        h.stand_on(is_door);
        let scene = h.app.context_mut().scene.as_mut().unwrap();
        scene.ledger_mut().set(DOOR_UNLOCKED, true);
        h.press(InputEvent::Char('E'));
        if chapter + 1 < chapters {
            h.through_intro();
        }
    }

    assert_eq!(h.app.current(), ScreenId::Win);
    assert_eq!(h.count(ScreenId::Win), 1);
    assert_eq!(
        h.app.context_mut().advance_chapter().unwrap(),
        Advance::AlreadyCompleted
    );

    h.key(Key::Escape);
    assert_eq!(h.app.current(), ScreenId::Menu);
    assert_eq!(h.count(ScreenId::Win), 1);
}

#[test]
fn terminal_round_trip() {
    let mut h = Harness::new();
    h.start_game();
    h.stand_on(is_terminal);
    h.app
        .context_mut()
        .scene
        .as_mut()
        .unwrap()
        .ledger_mut()
        .set(POWER_RESTORED, true);

    h.press(InputEvent::Char('e'));
    assert_eq!(h.app.current(), ScreenId::Terminal);
    assert!(h.played.borrow().iter().any(|n| n == "terminal_music"));

    // Fade in, then let the boot text finish.
    h.ticks(300);
    for c in "exit".chars() {
        h.press(InputEvent::Char(c));
    }
    h.key(Key::Enter);
    h.ticks(120);
    assert_eq!(h.app.current(), ScreenId::Game);
    assert_eq!(h.app.context().levels.current_index(), 0);
}

#[test]
fn menu_music_fades_once_the_menu_is_left() {
    let mut h = Harness::new();
    h.start_game();
    assert!(h.app.mixer().is_playing("menu_music"));
    h.ticks(60);
    assert!(!h.app.mixer().is_playing("menu_music"));
    assert!(h.app.mixer().is_playing("ambient_music"));
}

#[test]
fn game_layers_are_composited_back_to_front() {
    let mut h = Harness::new();
    h.start_game();
    h.ticks(30);

    let mut canvas = RecordingCanvas::new();
    h.app.draw(&mut canvas);
    let layers = canvas.layers();
    assert!(!layers.is_empty());
    assert!(layers.windows(2).all(|w| w[0] <= w[1]), "{layers:?}");
    assert!(canvas.has_text("The Cryo-Sanctum"));
}
