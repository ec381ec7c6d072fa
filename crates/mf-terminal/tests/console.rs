//! End-to-end console sessions against a live scene.

use mf_core::Cue;
use mf_core::level::LevelDef;
use mf_simulation::{
    BacklashTarget, Scene, SceneOptions, SimClock, SimConfig, SimEventKind, WardenEvent,
};
use mf_terminal::console::{HELP_TEXT, INTERFERENCE_MS};
use mf_terminal::{ConsoleKey, ConsoleRequest, Phase, TerminalConsole};

const LEVEL: &str = r#"{
    "title": "Chapter 2: The Test Archive",
    "intro": "",
    "player": { "start": [100, 100] },
    "walls": [[0, 0, 1280, 10], [0, 710, 1280, 10], [0, 0, 10, 720], [1270, 0, 10, 720]],
    "objects": [
        { "type": "CodeFragment", "x": 140, "y": 100, "w": 40, "h": 25, "id": "frag_1", "code": "player.speed=2.0" },
        { "type": "Terminal", "x": 600, "y": 300, "w": 30, "h": 20 },
        { "type": "Door", "x": 600, "y": 10, "w": 60, "h": 20 }
    ],
    "puzzles": {
        "p1": { "id": "puzzle1", "question": "Q1", "answer": "echo" },
        "p2": { "id": "puzzle2", "question": "Q2", "answer": "shadow" },
        "p3": { "id": "puzzle3", "question": "Q3", "answer": "river" }
    },
    "terminal_files": { "log_01.txt": "The hum never stops.", "memo": "Find the conduit." }
}"#;

struct Session {
    scene: Scene,
    console: TerminalConsole,
    clock: SimClock,
}

impl Session {
    fn new() -> Self {
        Self::with_level(LEVEL)
    }

    fn with_level(json: &str) -> Self {
        let level: LevelDef = serde_json::from_str(json).unwrap();
        let clock = SimClock::default();
        let mut scene = Scene::new(
            &level,
            1,
            &SimConfig::default(),
            SceneOptions {
                show_map: false,
                digital_rain: false,
            },
            &clock,
        );
        let mut console = TerminalConsole::new();
        console.enter(&mut scene, &clock);
        let mut session = Self {
            scene,
            console,
            clock,
        };
        session.until_active();
        session.console.fast_forward();
        session
    }

    fn tick(&mut self) -> Option<ConsoleRequest> {
        self.clock.advance();
        self.console.update(&mut self.scene, &self.clock)
    }

    fn until_active(&mut self) {
        for _ in 0..32 {
            if self.console.phase() == Phase::Active {
                return;
            }
            self.tick();
        }
        panic!("console never became active");
    }

    fn run(&mut self, line: &str) -> Vec<String> {
        let before = self.console.lines().len();
        self.console.submit(line, &mut self.scene, &self.clock);
        self.console.fast_forward();
        self.console
            .lines()
            .get(before..)
            .map(<[_]>::to_vec)
            .unwrap_or_default()
    }

    fn type_line(&mut self, line: &str) {
        for c in line.chars() {
            self.console
                .handle_key(ConsoleKey::Char(c), &mut self.scene, &self.clock);
        }
        self.console
            .handle_key(ConsoleKey::Enter, &mut self.scene, &self.clock);
        self.console.fast_forward();
    }

    fn cues(&mut self) -> Vec<Cue> {
        self.scene.sector.effects.cues.drain()
    }
}

#[test]
fn fades_in_then_boots() {
    let level: LevelDef = serde_json::from_str(LEVEL).unwrap();
    let mut clock = SimClock::default();
    let mut scene = Scene::new(&level, 1, &SimConfig::default(), SceneOptions::default(), &clock);
    let mut console = TerminalConsole::new();
    console.enter(&mut scene, &clock);
    assert_eq!(console.phase(), Phase::FadeIn);
    assert_eq!(console.fade_alpha(), 255);
    assert!(scene.sector.effects.cues.count_sound("terminal_music") == 1);

    for _ in 0..17 {
        clock.advance();
        console.update(&mut scene, &clock);
    }
    assert_eq!(console.phase(), Phase::Active);
    assert_eq!(console.fade_alpha(), 0);
    assert!(console.is_typing());
    assert!(console.lines().is_empty());

    // A keypress while typing only fast-forwards.
    console.handle_key(ConsoleKey::Char('x'), &mut scene, &clock);
    assert!(!console.is_typing());
    assert_eq!(console.input(), "");
    assert_eq!(console.lines()[0], "Mindfall OS [Kernel: CHIMERA_v1.3a_QUARANTINE]");
    assert_eq!(console.lines()[4], "Fragmentation Keys Re-integrated: 0/3");
}

#[test]
fn unlock_without_keys_is_refused() {
    let mut s = Session::new();
    s.cues();
    let out = s.run("unlock");
    assert_eq!(out[0], "remnant@Mindfall:~$ unlock");
    assert_eq!(
        out[1],
        "ERROR: Insufficient Fragmentation Keys. Full re-integration required."
    );
    assert!(!s.scene.ledger().door_unlocked());
    assert_eq!(s.scene.ledger().privilege(), 0);

    let cues = s.cues();
    assert!(cues.contains(&Cue::sfx("terminal_error")));
    assert!(cues.contains(&Cue::Speak(
        "ERROR: You are not whole. You cannot proceed.".to_string()
    )));
}

#[test]
fn integrating_every_code_unlocks_the_door() {
    let mut s = Session::new();
    for (i, code) in ["echo", "SHADOW", "river"].into_iter().enumerate() {
        let out = s.run(&format!("integrate {code}"));
        assert_eq!(
            out[1..],
            [
                "Memory fragment accepted. Consciousness re-integrating...".to_string(),
                "Fragmentation Key acquired.".to_string()
            ]
        );
        assert_eq!(s.scene.ledger().privilege(), i as u32 + 1);
    }

    let out = s.run("unlock");
    assert_eq!(out[0], "Aris.Thorne@Mindfall:# unlock");
    assert_eq!(
        out[1],
        "All Fragmentation Keys accepted. Quarantine lock for this sector disengaged..."
    );
    assert!(s.scene.ledger().door_unlocked());
    assert_eq!(s.cues().iter().filter(|c| **c == Cue::sfx("override_success")).count(), 4);
}

#[test]
fn integrate_is_idempotent_and_validated() {
    let mut s = Session::new();
    s.run("override echo");
    let out = s.run("integrate echo");
    assert_eq!(out[1], "Memory fragment already integrated. No effect.");
    assert_eq!(s.scene.ledger().privilege(), 1);

    assert_eq!(s.run("integrate nope")[1], "ERROR: Invalid memory code.");
    assert_eq!(s.run("integrate")[1], "Usage: integrate <memory_code>");
    assert_eq!(s.scene.ledger().privilege(), 1);
}

#[test]
fn shared_answers_solve_each_puzzle_in_turn() {
    let mut s = Session::with_level(&LEVEL.replace(r#""answer": "shadow""#, r#""answer": "echo""#));
    assert_eq!(
        s.run("integrate echo")[1],
        "Memory fragment accepted. Consciousness re-integrating..."
    );
    assert_eq!(
        s.run("integrate echo")[1],
        "Memory fragment accepted. Consciousness re-integrating..."
    );
    assert!(s.scene.ledger().is_solved("puzzle1"));
    assert!(s.scene.ledger().is_solved("puzzle2"));
    assert_eq!(s.scene.ledger().privilege(), 2);

    assert_eq!(
        s.run("integrate echo")[1],
        "Memory fragment already integrated. No effect."
    );
    assert_eq!(s.scene.ledger().privilege(), 2);
}

#[test]
fn exec_player_speed_doubles_once_and_triggers_backlash() {
    let mut s = Session::new();
    assert_eq!(s.scene.try_interact(&s.clock), None);
    assert_eq!(s.scene.sector.fragments.code("frag_1"), Some("player.speed=2.0"));

    // Below privilege 2 the fragment is untouched.
    assert_eq!(
        s.run("exec frag_1")[1],
        "ERROR: Command requires privilege level 2 or higher."
    );
    assert!(s.scene.sector.fragments.code("frag_1").is_some());

    s.run("integrate echo");
    s.run("integrate shadow");
    let base = s.scene.sector.player.speed;

    let out = s.run("exec frag_1");
    assert_eq!(
        out[1..],
        [
            "Executing code from 'frag_1'...".to_string(),
            "Player speed modifier set to 2.0x.".to_string(),
            "...Execution successful. System integrity compromised.".to_string(),
        ]
    );
    assert!((s.scene.sector.player.speed - base * 2.0).abs() < f32::EPSILON);
    assert!(s.scene.sector.fragments.is_used("frag_1"));
    assert_eq!(s.scene.sector.hunters.len(), 1);

    let backlashes: Vec<_> = s
        .scene
        .sector
        .events
        .events()
        .iter()
        .filter_map(|e| match e.kind {
            SimEventKind::Backlash { target, value } => Some((target, value)),
            _ => None,
        })
        .collect();
    assert_eq!(backlashes, vec![(BacklashTarget::Player, 2.0)]);

    // A second run finds nothing and changes nothing.
    assert_eq!(
        s.run("exec frag_1")[1],
        "ERROR: Code Fragment 'frag_1' not found or already used."
    );
    assert!((s.scene.sector.player.speed - base * 2.0).abs() < f32::EPSILON);
}

#[test]
fn exec_failures_leave_fragments_in_place() {
    let mut s = Session::new();
    s.run("integrate echo");
    s.run("integrate shadow");
    s.scene.sector.fragments.collect("frag_bad", "player.jump=3");
    s.scene.sector.fragments.collect("frag_junk", "rm -rf memories");
    s.scene.sector.fragments.collect("frag_slow", "hunter.speed=0.5");

    assert_eq!(s.run("exec")[1], "Usage: exec <fragment_id>");
    assert_eq!(
        s.run("exec frag_bad")[2],
        "ERROR: Invalid target or attribute in code fragment."
    );
    assert_eq!(
        s.run("exec frag_junk")[2],
        "ERROR: Failed to parse code fragment 'rm -rf memories'."
    );
    assert_eq!(
        s.run("exec frag_slow")[2],
        "Execution failed: No Hunters active in sector."
    );
    for id in ["frag_bad", "frag_junk", "frag_slow"] {
        assert!(s.scene.sector.fragments.code(id).is_some(), "{id}");
    }
}

#[test]
fn exec_hunter_speed_shortens_the_warden_cooldown() {
    let mut s = Session::new();
    s.run("integrate echo");
    s.run("integrate shadow");
    s.scene.sector.spawn_hunter();
    s.scene.sector.fragments.collect("frag_slow", "hunter.speed=0.5");
    let before = s.scene.warden().cooldown_ms();

    let out = s.run("exec frag_slow");
    assert_eq!(out[2], "All Warden Hunter speed modifiers set to 0.5x.");
    assert!((s.scene.sector.hunters[0].speed - 1.0).abs() < f32::EPSILON);
    assert_eq!(s.scene.warden().cooldown_ms(), before - 4000);
    assert_eq!(s.scene.warden().next_event_at(), s.clock.now_ms() + 1000);
}

#[test]
fn status_ls_and_cat() {
    let mut s = Session::new();
    let out = s.run("status");
    assert_eq!(
        out[1..],
        [
            "Fragmentation Keys: 0/3".to_string(),
            "Sector Lock: LOCKED".to_string(),
            "Protocol Damnatio Memoriae: Awaiting full integration".to_string(),
        ]
    );
    assert!(s.cues().iter().any(|c| matches!(c, Cue::Speak(_))));

    assert_eq!(s.run("ls")[1], "log_01.txt memo");
    assert_eq!(s.run("cat LOG_01.TXT")[1], "The hum never stops.");
    assert_eq!(s.run("cat diary")[1], "ERROR: Fragment not found: 'diary'");
    assert_eq!(s.run("cat")[1], "Usage: cat <fragment>");
}

#[test]
fn unknown_commands_suggest_close_verbs() {
    let mut s = Session::new();
    assert_eq!(
        s.run("stats")[1],
        "Command not recognized: 'stats'. Did you mean 'status'?"
    );
    assert_eq!(s.run("dance")[1], "Command not recognized: 'dance'.");
    assert_eq!(s.run("").len(), 1);
}

#[test]
fn help_listing() {
    let mut s = Session::new();
    let out = s.run("help");
    assert_eq!(out[1..].join("\n"), HELP_TEXT);
    insta::assert_snapshot!(out[1..].join("\n"), @r"
    Available Commands:
      status           // Check system integrity and protocol status.
      unlock           // [REQUIRES 3 KEYS] Unlock passage to next sector.
      integrate <code> // Input re-integrated memory code.
      exec <fragment>  // [REQUIRES 2 KEYS] Execute a recovered code fragment.
      ls               // List accessible data fragments.
      cat <fragment>   // Read a data fragment.
      clear            // Clear the screen.
      exit             // Disconnect from terminal.
    ");
}

#[test]
fn clear_empties_the_scrollback() {
    let mut s = Session::new();
    s.run("ls");
    s.run("clear");
    assert!(s.console.lines().is_empty());
}

#[test]
fn typed_input_history_and_exit() {
    let mut s = Session::new();
    s.type_line("ls");
    s.type_line("status");
    assert_eq!(s.console.history().len(), 2);

    s.console.handle_key(ConsoleKey::Up, &mut s.scene, &s.clock);
    assert_eq!(s.console.input(), "status");
    s.console.handle_key(ConsoleKey::Up, &mut s.scene, &s.clock);
    assert_eq!(s.console.input(), "ls");
    s.console.handle_key(ConsoleKey::Down, &mut s.scene, &s.clock);
    assert_eq!(s.console.input(), "status");
    s.console.handle_key(ConsoleKey::Down, &mut s.scene, &s.clock);
    assert_eq!(s.console.input(), "");
    s.console.handle_key(ConsoleKey::Char('q'), &mut s.scene, &s.clock);
    s.console.handle_key(ConsoleKey::Backspace, &mut s.scene, &s.clock);
    assert_eq!(s.console.input(), "");
    assert!(s.cues().iter().any(|c| *c == Cue::sfx("key_press")));

    s.type_line("exit");
    assert_eq!(s.console.phase(), Phase::FadeOut);
    let mut requests = Vec::new();
    for _ in 0..40 {
        if let Some(r) = s.tick() {
            requests.push(r);
        }
    }
    assert_eq!(requests, vec![ConsoleRequest::ReturnToGame]);
    assert_eq!(s.console.phase(), Phase::Closed);

    s.console.exit(&mut s.scene);
    assert!(s.cues().contains(&Cue::stop("terminal_music", 500)));
}

#[test]
fn escape_fades_out() {
    let mut s = Session::new();
    s.console.handle_key(ConsoleKey::Escape, &mut s.scene, &s.clock);
    assert_eq!(s.console.phase(), Phase::FadeOut);
}

#[test]
fn interference_surfaces_once_and_corrupts_typing() {
    let mut s = Session::new();
    s.scene.ledger_mut().increment_privilege();
    s.scene.force_event(WardenEvent::TerminalInterference, &s.clock);
    assert!(s.scene.has_interference());
    s.cues();

    s.tick();
    let last = s.console.lines().last().cloned().unwrap();
    assert!(last.starts_with(" [Warden]: "), "{last}");
    assert!(!s.scene.has_interference());
    assert!(s.cues().contains(&Cue::sfx("terminal_error")));
    assert!(s.console.is_corrupting(s.clock.now_ms()));

    let lines = s.console.lines().len();
    s.tick();
    assert_eq!(s.console.lines().len(), lines);

    for _ in 0..200 {
        s.console
            .handle_key(ConsoleKey::Char('a'), &mut s.scene, &s.clock);
    }
    let corrupted = s.console.input().chars().filter(|c| *c != 'a').count();
    assert!(corrupted > 20 && corrupted < 120, "{corrupted}");
    assert!(s.cues().iter().any(|c| *c == Cue::sfx("glitch")));

    let ticks = s.clock.ms_to_ticks(INTERFERENCE_MS) + 1;
    for _ in 0..ticks {
        s.tick();
    }
    assert!(!s.console.is_corrupting(s.clock.now_ms()));
}
