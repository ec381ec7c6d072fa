//! The in-world terminal console.
//!
//! A [`TerminalConsole`] is a line-oriented shell over the active [`Scene`]:
//! it reads and writes the scene's ledger, looks up its puzzles and files,
//! executes collected code fragments, and pushes its sounds and narration
//! into the scene's cue queue so the front end drains a single stream.

use mf_core::ledger::{DOOR_UNLOCKED, UNLOCK_PRIVILEGE};
use mf_core::{Cue, FragmentCode};
use mf_simulation::{BacklashTarget, Scene, SimClock, SimError};
use rand::Rng;

use crate::error::{TerminalError, TerminalResult};
use crate::history::History;
use crate::parser::{TerminalCommand, parse_command, resolve_file, suggest_command};
use crate::typewriter::Typewriter;

/// Alpha change per tick while fading.
pub const FADE_STEP: u8 = 15;
/// How long typed input stays corrupted after an interference line.
pub const INTERFERENCE_MS: u64 = 5000;
/// Chance that a typed character is corrupted during interference.
pub const INTERFERENCE_RATE: f64 = 0.3;
/// Scrollback width in columns.
pub const WRAP_COLUMNS: usize = 92;
/// Privilege needed for `exec`.
pub const EXEC_PRIVILEGE: u32 = 2;

const CORRUPTION_GLYPHS: &[char] = &[
    '#', '?', '!', '_', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// The `help` listing.
pub const HELP_TEXT: &str = "Available Commands:
  status           // Check system integrity and protocol status.
  unlock           // [REQUIRES 3 KEYS] Unlock passage to next sector.
  integrate <code> // Input re-integrated memory code.
  exec <fragment>  // [REQUIRES 2 KEYS] Execute a recovered code fragment.
  ls               // List accessible data fragments.
  cat <fragment>   // Read a data fragment.
  clear            // Clear the screen.
  exit             // Disconnect from terminal.";

/// Console sub-phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fading in from black; input ignored.
    FadeIn,
    /// Accepting input.
    Active,
    /// Fading out to black; input ignored.
    FadeOut,
    /// Fade-out finished and the return to the game was requested.
    Closed,
}

/// Keys the console reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleKey {
    /// A printable character.
    Char(char),
    /// Delete the last character.
    Backspace,
    /// Submit the line.
    Enter,
    /// Recall an older command.
    Up,
    /// Recall a newer command.
    Down,
    /// Disconnect.
    Escape,
}

/// A state change the console asks the application for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleRequest {
    /// Close the console and resume the game.
    ReturnToGame,
}

/// The prompt shown for a privilege level.
pub fn prompt_for(privilege: u32) -> &'static str {
    match privilege {
        0 => "remnant@Mindfall:~$ ",
        1 => "fragment@Mindfall:~$ ",
        2 => "gestalt@Mindfall:# ",
        _ => "Aris.Thorne@Mindfall:# ",
    }
}

/// Boot sequence typed out on entry.
pub fn boot_sequence(privilege: u32) -> Vec<String> {
    vec![
        "Mindfall OS [Kernel: CHIMERA_v1.3a_QUARANTINE]".to_string(),
        "...".to_string(),
        "Cognitive Integrity Check... FAILED.".to_string(),
        "Parasitic Data-Stream Detected.".to_string(),
        format!("Fragmentation Keys Re-integrated: {privilege}/{UNLOCK_PRIVILEGE}"),
        "Type 'help' for a list of commands.".to_string(),
    ]
}

/// Wrap text at word boundaries. Embedded newlines always break.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for raw in text.split('\n') {
        if raw.chars().count() <= width {
            out.push(raw.to_string());
            continue;
        }
        let mut line = String::new();
        let mut line_len = 0;
        for word in raw.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            if line_len > 0 && line_len + 1 + word.len() <= width {
                line.push(' ');
                line.extend(word.iter());
                line_len += 1 + word.len();
                continue;
            }
            if line_len > 0 {
                out.push(std::mem::take(&mut line));
            }
            while word.len() > width {
                let rest = word.split_off(width);
                out.push(word.into_iter().collect());
                word = rest;
            }
            line_len = word.len();
            line = word.into_iter().collect();
        }
        out.push(line);
    }
    out
}

/// Terminal console state for one visit.
#[derive(Debug, Clone)]
pub struct TerminalConsole {
    phase: Phase,
    fade_alpha: u8,
    input: String,
    lines: Vec<String>,
    typewriter: Typewriter,
    history: History,
    corrupt_until: Option<u64>,
    last_ms: u64,
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalConsole {
    /// A closed console. Call [`TerminalConsole::enter`] to open it.
    pub fn new() -> Self {
        Self {
            phase: Phase::Closed,
            fade_alpha: u8::MAX,
            input: String::new(),
            lines: Vec::new(),
            typewriter: Typewriter::default(),
            history: History::default(),
            corrupt_until: None,
            last_ms: 0,
        }
    }

    /// Open the console: reset the screen, start the music, type the boot
    /// sequence once the fade-in completes.
    pub fn enter(&mut self, scene: &mut Scene, clock: &SimClock) {
        self.phase = Phase::FadeIn;
        self.fade_alpha = u8::MAX;
        self.input.clear();
        self.lines.clear();
        self.typewriter.clear();
        self.history.clear();
        self.corrupt_until = None;
        self.last_ms = clock.now_ms();

        scene.sector.effects.cues.push(Cue::music("terminal_music", 500));
        for line in boot_sequence(scene.ledger().privilege()) {
            self.typewriter.push(line);
        }
        tracing::debug!(chapter = scene.chapter(), "terminal opened");
    }

    /// Close the console and fade its music out.
    pub fn exit(&mut self, scene: &mut Scene) {
        self.phase = Phase::Closed;
        scene.sector.effects.cues.push(Cue::stop("terminal_music", 500));
        tracing::debug!("terminal closed");
    }

    /// Advance fades, surface staged interference, and reveal text.
    pub fn update(&mut self, scene: &mut Scene, clock: &SimClock) -> Option<ConsoleRequest> {
        let now = clock.now_ms();
        let elapsed = now.saturating_sub(self.last_ms);
        self.last_ms = now;

        match self.phase {
            Phase::FadeIn => {
                self.fade_alpha = self.fade_alpha.saturating_sub(FADE_STEP);
                if self.fade_alpha == 0 {
                    self.phase = Phase::Active;
                }
                return None;
            }
            Phase::FadeOut => {
                self.fade_alpha = self.fade_alpha.saturating_add(FADE_STEP);
                if self.fade_alpha == u8::MAX {
                    self.phase = Phase::Closed;
                    return Some(ConsoleRequest::ReturnToGame);
                }
                return None;
            }
            Phase::Closed => return None,
            Phase::Active => {}
        }

        if !self.typewriter.is_busy()
            && let Some(line) = scene.take_interference()
        {
            self.write_instant(&line);
            scene.sector.effects.cues.push(Cue::sfx("terminal_error"));
            self.corrupt_until = Some(now + INTERFERENCE_MS);
            tracing::debug!("interference surfaced in terminal");
        }
        if self.corrupt_until.is_some_and(|until| now >= until) {
            self.corrupt_until = None;
        }

        let finished = self.typewriter.advance(elapsed);
        self.lines.extend(finished);
        None
    }

    /// React to one key. Ignored unless the console is active; while text
    /// is still typing, any key only fast-forwards it.
    pub fn handle_key(&mut self, key: ConsoleKey, scene: &mut Scene, clock: &SimClock) {
        if self.phase != Phase::Active {
            return;
        }
        if self.typewriter.is_busy() {
            self.fast_forward();
            return;
        }
        scene.sector.effects.cues.push(Cue::sfx("key_press"));

        match key {
            ConsoleKey::Enter => {
                let line = std::mem::take(&mut self.input);
                self.history.record(&line);
                self.submit(&line, scene, clock);
            }
            ConsoleKey::Backspace => {
                self.input.pop();
            }
            ConsoleKey::Escape => self.begin_fade_out(),
            ConsoleKey::Up => {
                if let Some(line) = self.history.older() {
                    self.input = line.to_string();
                }
            }
            ConsoleKey::Down => {
                if let Some(line) = self.history.newer() {
                    self.input = line.to_string();
                }
            }
            ConsoleKey::Char(c) => self.type_char(c, scene, clock),
        }
    }

    fn type_char(&mut self, c: char, scene: &mut Scene, clock: &SimClock) {
        if c.is_control() {
            return;
        }
        if self.is_corrupting(clock.now_ms())
            && scene.sector.rng.random_bool(INTERFERENCE_RATE)
        {
            let glyph = CORRUPTION_GLYPHS[scene.sector.rng.random_range(0..CORRUPTION_GLYPHS.len())];
            self.input.push(glyph);
            scene.sector.effects.cues.push(Cue::sfx("glitch"));
        } else {
            self.input.push(c);
        }
    }

    /// Echo and run one line as if it had been typed and submitted.
    pub fn submit(&mut self, line: &str, scene: &mut Scene, clock: &SimClock) {
        scene.sector.sync(clock);
        let echo = format!("{}{}", prompt_for(scene.ledger().privilege()), line.trim());
        self.write_instant(&echo);

        let command = parse_command(line);
        if let Err(e) = self.execute(command, scene, clock) {
            tracing::debug!(error = %e, "terminal command failed");
            self.write(&e.to_string());
            scene.sector.effects.cues.push(Cue::sfx("terminal_error"));
        }
        scene.sector.record_ledger_changes();
    }

    fn execute(
        &mut self,
        command: TerminalCommand,
        scene: &mut Scene,
        clock: &SimClock,
    ) -> TerminalResult<()> {
        match command {
            TerminalCommand::Empty => Ok(()),
            TerminalCommand::Help => {
                self.write_instant(HELP_TEXT);
                Ok(())
            }
            TerminalCommand::Status => {
                self.do_status(scene);
                Ok(())
            }
            TerminalCommand::Unlock => self.do_unlock(scene),
            TerminalCommand::Integrate { code } => {
                let code = code.ok_or(TerminalError::IntegrateUsage)?;
                self.do_integrate(&code, scene)
            }
            TerminalCommand::Exec { fragment } => self.do_exec(fragment, scene, clock),
            TerminalCommand::List => {
                self.do_list(scene);
                Ok(())
            }
            TerminalCommand::Cat { file } => {
                let file = file.ok_or(TerminalError::CatUsage)?;
                self.do_cat(&file, scene)
            }
            TerminalCommand::Clear => {
                self.lines.clear();
                self.typewriter.clear();
                Ok(())
            }
            TerminalCommand::Exit => {
                self.begin_fade_out();
                Ok(())
            }
            TerminalCommand::Unknown { verb } => Err(TerminalError::UnknownCommand {
                suggestion: suggest_command(&verb),
                verb,
            }),
        }
    }

    fn do_status(&mut self, scene: &mut Scene) {
        let privilege = scene.ledger().privilege();
        let door = if scene.ledger().door_unlocked() {
            "UNLOCKED"
        } else {
            "LOCKED"
        };
        let protocol = if privilege < UNLOCK_PRIVILEGE {
            "Awaiting full integration"
        } else {
            "Ready for initiation"
        };
        self.write(&format!(
            "Fragmentation Keys: {privilege}/{UNLOCK_PRIVILEGE}\nSector Lock: {door}\nProtocol Damnatio Memoriae: {protocol}"
        ));
        scene.sector.effects.cues.push(Cue::Speak(format!(
            "Fragmentation Keys: {privilege} of {UNLOCK_PRIVILEGE}. Sector Lock: {door}. Protocol Damnatio Memoriae: {protocol}"
        )));
    }

    fn do_unlock(&mut self, scene: &mut Scene) -> TerminalResult<()> {
        if scene.ledger().privilege() < UNLOCK_PRIVILEGE {
            scene.sector.effects.cues.push(Cue::Speak(
                "ERROR: You are not whole. You cannot proceed.".to_string(),
            ));
            return Err(TerminalError::InsufficientKeys);
        }
        self.write("All Fragmentation Keys accepted. Quarantine lock for this sector disengaged...");
        scene.ledger_mut().set(DOOR_UNLOCKED, true);
        let cues = &mut scene.sector.effects.cues;
        cues.push(Cue::Speak("Access granted. You may proceed.".to_string()));
        cues.push(Cue::sfx("override_success"));
        Ok(())
    }

    fn do_integrate(&mut self, code: &str, scene: &mut Scene) -> TerminalResult<()> {
        let code = code.to_lowercase();
        let ledger = scene.ledger();
        let mut matches = scene
            .level()
            .puzzles
            .values()
            .filter(|p| p.answer.to_lowercase() == code)
            .map(|p| &p.id);
        let first = matches.next().ok_or(TerminalError::InvalidMemoryCode)?;
        // Shared answers solve the next open puzzle.
        let puzzle_id = std::iter::once(first)
            .chain(matches)
            .find(|id| !ledger.is_solved(id))
            .unwrap_or(first)
            .clone();

        if !scene.ledger_mut().mark_solved(&puzzle_id) {
            self.write("Memory fragment already integrated. No effect.");
            return Ok(());
        }
        scene.ledger_mut().increment_privilege();
        self.write("Memory fragment accepted. Consciousness re-integrating...\nFragmentation Key acquired.");
        let cues = &mut scene.sector.effects.cues;
        cues.push(Cue::Speak(
            "Memory fragment accepted. You are one step closer to the end.".to_string(),
        ));
        cues.push(Cue::sfx("override_success"));
        Ok(())
    }

    fn do_exec(
        &mut self,
        fragment: Option<String>,
        scene: &mut Scene,
        clock: &SimClock,
    ) -> TerminalResult<()> {
        if scene.ledger().privilege() < EXEC_PRIVILEGE {
            return Err(TerminalError::PrivilegeRequired {
                required: EXEC_PRIVILEGE,
            });
        }
        let requested = fragment.ok_or(TerminalError::ExecUsage)?;
        let fragments = &scene.sector.fragments;
        let (id, code) = fragments
            .held()
            .find(|held| held.eq_ignore_ascii_case(&requested))
            .and_then(|id| fragments.code(id).map(|code| (id.to_string(), code.to_string())))
            .ok_or_else(|| TerminalError::FragmentNotFound(requested.clone()))?;

        self.write(&format!("Executing code from '{id}'..."));
        let parsed: FragmentCode = code
            .parse()
            .map_err(|_| TerminalError::MalformedFragment(code.clone()))?;
        let target = scene.apply_modifier(&parsed).map_err(|e| match e {
            SimError::NoHunters => TerminalError::NoHunters,
            _ => TerminalError::InvalidTarget,
        })?;

        scene.sector.fragments.consume(&id);
        let value = parsed.value;
        match target {
            BacklashTarget::Player => self.write(&format!("Player speed modifier set to {value:?}x.")),
            BacklashTarget::Hunter => {
                self.write(&format!("All Warden Hunter speed modifiers set to {value:?}x."))
            }
        }
        scene.sector.effects.cues.push(Cue::sfx("override_success"));
        self.write("...Execution successful. System integrity compromised.");
        tracing::info!(fragment = %id, %target, value, "code fragment executed");
        scene.backlash(target, value, clock);
        Ok(())
    }

    fn do_list(&mut self, scene: &Scene) {
        let files = &scene.level().terminal_files;
        if files.is_empty() {
            self.write("No data fragments found.");
        } else {
            let names: Vec<&str> = files.keys().map(String::as_str).collect();
            self.write(&names.join(" "));
        }
    }

    fn do_cat(&mut self, file: &str, scene: &Scene) -> TerminalResult<()> {
        let files = &scene.level().terminal_files;
        let name = resolve_file(files.keys(), file)
            .ok_or_else(|| TerminalError::FileNotFound(file.to_string()))?;
        let body = files.get(name).cloned().unwrap_or_default();
        self.write_instant(&body);
        Ok(())
    }

    fn begin_fade_out(&mut self) {
        if matches!(self.phase, Phase::Active | Phase::FadeIn) {
            self.phase = Phase::FadeOut;
        }
    }

    fn write(&mut self, text: &str) {
        for line in wrap_text(text, WRAP_COLUMNS) {
            self.typewriter.push(line);
        }
    }

    fn write_instant(&mut self, text: &str) {
        self.fast_forward();
        self.lines.extend(wrap_text(text, WRAP_COLUMNS));
    }

    /// Finish any text still typing.
    pub fn fast_forward(&mut self) {
        let rest = self.typewriter.flush();
        self.lines.extend(rest);
    }

    /// Current sub-phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Black overlay alpha for the fade.
    pub fn fade_alpha(&self) -> u8 {
        self.fade_alpha
    }

    /// The line being edited.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Completed scrollback lines, oldest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The line currently typing, as revealed so far.
    pub fn partial_line(&self) -> Option<&str> {
        self.typewriter.partial()
    }

    /// Whether output is still typing. The prompt is hidden meanwhile.
    pub fn is_typing(&self) -> bool {
        self.typewriter.is_busy()
    }

    /// Submitted commands.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Whether typed input is currently subject to corruption.
    pub fn is_corrupting(&self, now: u64) -> bool {
        self.corrupt_until.is_some_and(|until| now < until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_tracks_privilege() {
        assert_eq!(prompt_for(0), "remnant@Mindfall:~$ ");
        assert_eq!(prompt_for(1), "fragment@Mindfall:~$ ");
        assert_eq!(prompt_for(2), "gestalt@Mindfall:# ");
        assert_eq!(prompt_for(3), "Aris.Thorne@Mindfall:# ");
        assert_eq!(prompt_for(7), "Aris.Thorne@Mindfall:# ");
    }

    #[test]
    fn boot_sequence_reports_keys() {
        let boot = boot_sequence(2);
        assert_eq!(boot.len(), 6);
        assert_eq!(boot[4], "Fragmentation Keys Re-integrated: 2/3");
    }

    #[test]
    fn wrap_keeps_short_lines_and_indentation() {
        let lines = wrap_text("  short\nnext", 20);
        assert_eq!(lines, vec!["  short".to_string(), "next".to_string()]);
    }

    #[test]
    fn wrap_breaks_at_words() {
        let lines = wrap_text("aaa bbb ccc ddd", 7);
        assert_eq!(lines, vec!["aaa bbb".to_string(), "ccc ddd".to_string()]);
    }

    #[test]
    fn wrap_splits_overlong_words() {
        let lines = wrap_text("abcdefghij xy", 4);
        assert_eq!(
            lines,
            vec![
                "abcd".to_string(),
                "efgh".to_string(),
                "ij".to_string(),
                "xy".to_string()
            ]
        );
    }

    #[test]
    fn every_line_fits() {
        let text = "word ".repeat(100);
        for line in wrap_text(&text, WRAP_COLUMNS) {
            assert!(line.chars().count() <= WRAP_COLUMNS);
        }
    }
}
