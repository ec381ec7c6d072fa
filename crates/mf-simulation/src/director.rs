//! The Warden: a timed, progress-gated adversarial event scheduler.
//!
//! Every firing assembles a candidate pool from the current chapter and
//! privilege level, picks one event and runs exactly one handler. Two rare
//! branches (jumpscare, personalized threat) roll before the pool and
//! return early when they hit.

use std::fmt;

use mf_core::{Cue, EntityKind};
use rand::Rng;
use rand::rngs::StdRng;

use crate::config::SimConfig;
use crate::event::SimEventKind;
use crate::sector::Sector;

/// Messages the Warden injects into the terminal console.
pub const INTERFERENCE_LINES: [&str; 2] = [
    " [Warden]: YOU ARE A GHOST IN YOUR OWN TOMB.",
    " [Warden]: YOUR MEMORIES ARE BUGS IN THE SYSTEM.",
];

/// Walls closer than this to the player are never shifted.
pub const MIMICRY_MIN_DISTANCE: f32 = 500.0;

/// Every event the Warden can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WardenEvent {
    /// Short weak glitch with a small shake.
    MinorGlitch,
    /// Full-screen static.
    StaticBurst,
    /// Long strong glitch with a purge warning.
    MajorGlitch,
    /// Auditory hallucination.
    Whisper,
    /// Static over a random interactive.
    ObjectCorruption,
    /// Stage a message for the terminal console.
    TerminalInterference,
    /// Deploy a hunter.
    SpawnHunter,
    /// Move a distant wall.
    EnvironmentalMimicry,
    /// Rare full-screen scare.
    Jumpscare,
    /// Rare message addressing the player by username.
    PersonalizedThreat,
}

impl WardenEvent {
    /// All events.
    pub const ALL: [Self; 10] = [
        Self::MinorGlitch,
        Self::StaticBurst,
        Self::MajorGlitch,
        Self::Whisper,
        Self::ObjectCorruption,
        Self::TerminalInterference,
        Self::SpawnHunter,
        Self::EnvironmentalMimicry,
        Self::Jumpscare,
        Self::PersonalizedThreat,
    ];

    /// Snake-case name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::MinorGlitch => "minor_glitch",
            Self::StaticBurst => "static_burst",
            Self::MajorGlitch => "major_glitch",
            Self::Whisper => "whisper_event",
            Self::ObjectCorruption => "object_corruption",
            Self::TerminalInterference => "terminal_interference",
            Self::SpawnHunter => "spawn_hunter",
            Self::EnvironmentalMimicry => "environmental_mimicry",
            Self::Jumpscare => "jumpscare",
            Self::PersonalizedThreat => "personalized_threat",
        }
    }

    /// Gating predicate: whether this event may fire at the given progress.
    pub fn is_available(self, chapter: usize, privilege: u32) -> bool {
        match self {
            Self::MinorGlitch | Self::StaticBurst => true,
            Self::Whisper => privilege >= 1,
            Self::ObjectCorruption | Self::TerminalInterference => privilege > 0,
            Self::SpawnHunter | Self::Jumpscare => chapter >= 2,
            Self::PersonalizedThreat => chapter >= 3,
            Self::MajorGlitch | Self::EnvironmentalMimicry => chapter >= 4,
        }
    }

    /// The weighted pool for one firing. Duplicates raise an event's odds.
    pub fn candidate_pool(chapter: usize, privilege: u32) -> Vec<Self> {
        let mut pool = vec![Self::MinorGlitch, Self::StaticBurst];
        if privilege >= 1 {
            pool.push(Self::Whisper);
        }
        if privilege > 0 {
            pool.extend([Self::ObjectCorruption, Self::TerminalInterference]);
        }
        if chapter >= 2 {
            pool.push(Self::SpawnHunter);
        }
        if chapter >= 4 {
            pool.extend([
                Self::MajorGlitch,
                Self::SpawnHunter,
                Self::EnvironmentalMimicry,
            ]);
        }
        pool
    }
}

impl fmt::Display for WardenEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What an executed code fragment modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacklashTarget {
    /// The player.
    Player,
    /// Every hunter in the sector.
    Hunter,
}

impl BacklashTarget {
    /// Resolve a fragment target name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "player" => Some(Self::Player),
            "hunter" => Some(Self::Hunter),
            _ => None,
        }
    }

    /// Fragment target name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Hunter => "hunter",
        }
    }
}

impl fmt::Display for BacklashTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The director's schedule and staged state.
#[derive(Debug, Clone)]
pub struct Warden {
    next_event_at: u64,
    cooldown_ms: u64,
    jitter_ms: u64,
    cooldown_floor_ms: u64,
    cooldown_step_ms: u64,
    jumpscare_chance: f64,
    personal_threat_chance: f64,
    username: Option<String>,
    interference: Option<String>,
}

impl Warden {
    /// A Warden whose first event is scheduled from `now`.
    pub fn new(config: &SimConfig, now: u64, rng: &mut StdRng) -> Self {
        let mut warden = Self {
            next_event_at: 0,
            cooldown_ms: config.warden_cooldown_ms,
            jitter_ms: config.warden_jitter_ms,
            cooldown_floor_ms: config.backlash_cooldown_floor_ms,
            cooldown_step_ms: config.backlash_cooldown_step_ms,
            jumpscare_chance: config.jumpscare_chance.clamp(0.0, 1.0),
            personal_threat_chance: config.personal_threat_chance.clamp(0.0, 1.0),
            username: config.resolve_username(),
            interference: None,
        };
        warden.reset_timer(now, rng);
        warden
    }

    /// When the next event fires (ms).
    pub fn next_event_at(&self) -> u64 {
        self.next_event_at
    }

    /// Current base cooldown (ms).
    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_ms
    }

    /// Schedule the next event at `now + cooldown ± jitter`.
    pub fn reset_timer(&mut self, now: u64, rng: &mut StdRng) {
        let jitter = self.jitter_ms as i64;
        let offset = self.cooldown_ms as i64 + rng.random_range(-jitter..=jitter);
        self.next_event_at = now + offset.max(0) as u64;
    }

    /// Fire an event if its time has passed. Returns the selected event.
    pub fn tick(&mut self, sector: &mut Sector) -> Option<WardenEvent> {
        let now = sector.now();
        if now <= self.next_event_at {
            return None;
        }
        let event = self.select(sector.chapter, sector.ledger.privilege(), &mut sector.rng);
        self.fire(event, sector);
        self.reset_timer(now, &mut sector.rng);
        Some(event)
    }

    /// Pick one event for the given progress.
    pub fn select(&self, chapter: usize, privilege: u32, rng: &mut StdRng) -> WardenEvent {
        if WardenEvent::Jumpscare.is_available(chapter, privilege)
            && rng.random_bool(self.jumpscare_chance)
        {
            return WardenEvent::Jumpscare;
        }
        if WardenEvent::PersonalizedThreat.is_available(chapter, privilege)
            && rng.random_bool(self.personal_threat_chance)
        {
            return WardenEvent::PersonalizedThreat;
        }
        let pool = WardenEvent::candidate_pool(chapter, privilege);
        pool[rng.random_range(0..pool.len())]
    }

    /// Run the handler for `event` and record the firing.
    pub fn fire(&mut self, event: WardenEvent, sector: &mut Sector) {
        let chapter = sector.chapter;
        let privilege = sector.ledger.privilege();
        tracing::debug!(event = event.name(), chapter, privilege, "warden event");
        let description = self.run(event, sector);
        sector.emit(
            SimEventKind::WardenFired {
                event,
                chapter,
                privilege,
            },
            description,
        );
    }

    fn run(&mut self, event: WardenEvent, sector: &mut Sector) -> String {
        match event {
            WardenEvent::MinorGlitch => minor_glitch(sector),
            WardenEvent::StaticBurst => {
                let now = sector.now();
                sector.effects.static_burst(now, 500, 180);
                sector.effects.start_shake(now, 400, 4);
                "static burst".into()
            }
            WardenEvent::MajorGlitch => major_glitch(sector),
            WardenEvent::Whisper => {
                sector.effects.cues.push(Cue::sfx("whisper"));
                "auditory hallucination".into()
            }
            WardenEvent::ObjectCorruption => object_corruption(sector),
            WardenEvent::TerminalInterference => {
                let line = INTERFERENCE_LINES[sector.rng.random_range(0..INTERFERENCE_LINES.len())];
                self.interference = Some(line.to_string());
                let now = sector.now();
                sector.effects.add_popup(
                    now,
                    "WARNING: I/O stream corrupted by Warden process.",
                    3000,
                );
                "terminal interference staged".into()
            }
            WardenEvent::SpawnHunter => spawn_hunter(sector),
            WardenEvent::EnvironmentalMimicry => {
                let now = sector.now();
                sector
                    .effects
                    .add_popup(now, "SYS.WARDEN//: Reality matrix compromised.", 3000);
                let shifted = shift_architecture(sector);
                let glitch = major_glitch(sector);
                format!("environmental mimicry ({shifted}); {glitch}")
            }
            WardenEvent::Jumpscare => {
                let now = sector.now();
                sector.effects.cues.push(Cue::sfx("jumpscare"));
                sector.effects.start_shake(now, 600, 30);
                sector.effects.static_burst(now, 400, 255);
                sector.effects.jumpscare(now);
                "jumpscare".into()
            }
            WardenEvent::PersonalizedThreat => match self.username.clone() {
                Some(name) => {
                    let now = sector.now();
                    sector.effects.add_popup(
                        now,
                        format!(
                            "SYS.WARDEN//: The ghost in the machine is not you. It's me. And I see you, {}.",
                            name.to_uppercase()
                        ),
                        6000,
                    );
                    "personalized threat".into()
                }
                None => format!("personalized threat unavailable, {}", major_glitch(sector)),
            },
        }
    }

    /// Punish an executed code fragment.
    pub fn backlash(&mut self, target: BacklashTarget, value: f32, sector: &mut Sector) {
        let now = sector.now();
        tracing::warn!(%target, value, "warden backlash");
        sector.effects.add_popup(
            now,
            "SYS.WARDEN//: Unauthorized execution detected. Deploying countermeasures...",
            4000,
        );
        sector.effects.trigger_glitch(now, 2000, 30);

        match target {
            BacklashTarget::Player if value > 1.0 => {
                sector.effects.add_popup(
                    now,
                    "BACKLASH: Threat signature amplified. Hunter deployed.",
                    5000,
                );
                spawn_hunter(sector);
            }
            BacklashTarget::Hunter if value < 1.0 => {
                sector.effects.add_popup(
                    now,
                    "BACKLASH: System integrity failing. Event frequency increased.",
                    5000,
                );
                self.cooldown_ms = self
                    .cooldown_ms
                    .saturating_sub(self.cooldown_step_ms)
                    .max(self.cooldown_floor_ms);
                self.next_event_at = now + 1000;
            }
            _ => {}
        }

        sector.emit(
            SimEventKind::Backlash { target, value },
            format!("backlash against {target}={value}"),
        );
    }

    /// The staged interference line, if any.
    pub fn interference(&self) -> Option<&str> {
        self.interference.as_deref()
    }

    /// Consume the staged interference line.
    pub fn take_interference(&mut self) -> Option<String> {
        self.interference.take()
    }
}

fn minor_glitch(sector: &mut Sector) -> String {
    let now = sector.now();
    sector.effects.trigger_glitch(now, 300, 8);
    sector.effects.start_shake(now, 300, 2);
    "minor glitch".into()
}

fn major_glitch(sector: &mut Sector) -> String {
    let now = sector.now();
    sector.effects.add_popup(
        now,
        "SYS.WARDEN//: Foreign entity detected. Purge protocols active.",
        2000,
    );
    sector.effects.trigger_glitch(now, 1200, 20);
    sector.effects.start_shake(now, 1000, 7);
    "major glitch".into()
}

fn object_corruption(sector: &mut Sector) -> String {
    if sector.interactives.is_empty() {
        return "nothing to corrupt".into();
    }
    let index = sector.rng.random_range(0..sector.interactives.len());
    let target = &sector.interactives[index];
    if matches!(target.kind, EntityKind::Door { .. }) {
        return format!("door resisted corruption, {}", minor_glitch(sector));
    }

    let (id, name) = (target.id, target.name.clone());
    let now = sector.now();
    sector.effects.corrupt(id, now, 2000);
    sector
        .effects
        .add_popup(now, "SYS.WARDEN//: Data instability detected.", 2000);
    sector.emit(
        SimEventKind::EntityCorrupted { entity: id },
        format!("corrupted {name}"),
    );
    format!("corrupted {name}")
}

fn spawn_hunter(sector: &mut Sector) -> String {
    if !sector.hunters.is_empty() {
        return format!("hunter already present, {}", object_corruption(sector));
    }
    let now = sector.now();
    sector
        .effects
        .add_popup(now, "WARNING: Warden process located in this sector.", 3000);
    let id = sector.spawn_hunter();
    format!("hunter {id} deployed")
}

fn shift_architecture(sector: &mut Sector) -> String {
    let (px, py) = sector.player.rect.center();
    let candidates: Vec<usize> = sector
        .walls
        .iter()
        .enumerate()
        .filter(|(_, w)| {
            let (cx, cy) = w.rect.center();
            (cx - px).hypot(cy - py) > MIMICRY_MIN_DISTANCE
        })
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return "no distant wall".into();
    }

    let index = candidates[sector.rng.random_range(0..candidates.len())];
    let wall = &sector.walls[index];
    let (id, shifted) = (wall.id, wall.rect.translate(wall.rect.w, 0.0));
    if sector.is_blocked(&shifted, id) {
        return format!("wall {id} blocked");
    }
    sector.walls[index].rect = shifted;
    sector.emit(
        SimEventKind::WallShifted { wall: id },
        format!("wall {id} shifted"),
    );
    format!("wall {id} shifted")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_core::ledger::Ledger;
    use mf_core::{Entity, EntityId, Rect};
    use proptest::prelude::*;
    use rand::SeedableRng;

    use crate::clock::SimClock;
    use crate::event::EventLog;
    use crate::movement::Player;

    fn sector(chapter: usize) -> Sector {
        let walls = vec![
            Entity::new(EntityId(0), Rect::new(0.0, 0.0, 10.0, 720.0), EntityKind::Wall),
            Entity::new(EntityId(1), Rect::new(1200.0, 600.0, 20.0, 20.0), EntityKind::Wall),
        ];
        let interactives = vec![Entity::new(
            EntityId(2),
            Rect::new(300.0, 300.0, 40.0, 40.0),
            EntityKind::Terminal,
        )];
        Sector::new(
            chapter,
            Player::new(100.0, 100.0),
            walls,
            interactives,
            Ledger::new(["puzzle1", "puzzle2", "puzzle3"]),
            EventLog::new(0),
            StdRng::seed_from_u64(9),
            (1280.0, 720.0),
            3,
        )
    }

    fn warden(rng: &mut StdRng) -> Warden {
        Warden::new(
            &SimConfig::default().with_username(Some("ada".into())),
            0,
            rng,
        )
    }

    fn at(sector: &mut Sector, ms: u64) {
        let mut clock = SimClock::new(1000);
        for _ in 0..ms {
            clock.advance();
        }
        sector.sync(&clock);
    }

    #[test]
    fn pool_grows_with_progress() {
        assert_eq!(
            WardenEvent::candidate_pool(0, 0),
            vec![WardenEvent::MinorGlitch, WardenEvent::StaticBurst]
        );
        let pool = WardenEvent::candidate_pool(1, 1);
        assert!(pool.contains(&WardenEvent::Whisper));
        assert!(pool.contains(&WardenEvent::TerminalInterference));
        assert!(!pool.contains(&WardenEvent::SpawnHunter));
        let pool = WardenEvent::candidate_pool(4, 3);
        assert_eq!(
            pool.iter().filter(|e| **e == WardenEvent::SpawnHunter).count(),
            2
        );
        assert!(pool.contains(&WardenEvent::EnvironmentalMimicry));
    }

    #[test]
    fn first_event_within_jitter() {
        let mut rng = StdRng::seed_from_u64(1);
        let w = warden(&mut rng);
        assert!((8_000..=16_000).contains(&w.next_event_at()));
    }

    #[test]
    fn tick_fires_only_after_deadline() {
        let mut sector = sector(0);
        let mut w = warden(&mut sector.rng);
        let deadline = w.next_event_at();
        at(&mut sector, deadline);
        assert_eq!(w.tick(&mut sector), None);
        at(&mut sector, deadline + 1);
        let fired = w.tick(&mut sector).unwrap();
        assert!(fired.is_available(0, 0));
        assert!(w.next_event_at() > deadline);
        assert_eq!(sector.events.warden_firings().count(), 1);
    }

    #[test]
    fn second_hunter_becomes_corruption() {
        let mut sector = sector(2);
        let mut w = warden(&mut sector.rng);
        w.fire(WardenEvent::SpawnHunter, &mut sector);
        assert_eq!(sector.hunters.len(), 1);
        w.fire(WardenEvent::SpawnHunter, &mut sector);
        assert_eq!(sector.hunters.len(), 1);
        assert!(sector.effects.is_corrupted(EntityId(2)));
    }

    #[test]
    fn door_resists_corruption() {
        let mut sector = sector(1);
        sector.interactives = vec![Entity::new(
            EntityId(2),
            Rect::new(300.0, 300.0, 40.0, 40.0),
            EntityKind::Door {
                image_unlocked: None,
            },
        )];
        let mut w = warden(&mut sector.rng);
        w.fire(WardenEvent::ObjectCorruption, &mut sector);
        assert_eq!(sector.effects.corrupted().count(), 0);
        assert_eq!(sector.effects.glitch.intensity(), 8);
        assert_eq!(sector.effects.cues.count_sound("glitch"), 1);
    }

    #[test]
    fn interference_is_consumed_once() {
        let mut sector = sector(0);
        let mut w = warden(&mut sector.rng);
        w.fire(WardenEvent::TerminalInterference, &mut sector);
        let line = w.take_interference().unwrap();
        assert!(INTERFERENCE_LINES.contains(&line.as_str()));
        assert!(w.take_interference().is_none());
    }

    #[test]
    fn personalized_threat_uses_username() {
        let mut sector = sector(3);
        let mut w = warden(&mut sector.rng);
        w.fire(WardenEvent::PersonalizedThreat, &mut sector);
        assert!(sector.effects.popups()[0].text.ends_with("And I see you, ADA."));
    }

    #[test]
    fn personalized_threat_falls_back_to_major_glitch() {
        let mut sector = sector(3);
        let mut w = warden(&mut sector.rng);
        w.username = None;
        w.fire(WardenEvent::PersonalizedThreat, &mut sector);
        assert_eq!(
            sector.effects.popups()[0].text,
            "SYS.WARDEN//: Foreign entity detected. Purge protocols active."
        );
    }

    #[test]
    fn mimicry_shifts_distant_wall_when_clear() {
        let mut sector = sector(4);
        let mut w = warden(&mut sector.rng);
        w.fire(WardenEvent::EnvironmentalMimicry, &mut sector);
        // Only the small wall in the far corner is more than 500 units away.
        assert_eq!(sector.walls[1].rect.x, 1220.0);
        assert_eq!(sector.walls[0].rect.x, 0.0);
    }

    #[test]
    fn mimicry_reverts_when_blocked() {
        let mut sector = sector(4);
        sector.interactives.push(Entity::new(
            EntityId(5),
            Rect::new(1225.0, 600.0, 20.0, 20.0),
            EntityKind::NoticeBoard {
                message: "blocker".into(),
            },
        ));
        let mut w = warden(&mut sector.rng);
        w.fire(WardenEvent::EnvironmentalMimicry, &mut sector);
        assert_eq!(sector.walls[1].rect.x, 1200.0);
        assert!(sector.events.events_for_entity(EntityId(1)).is_empty());
    }

    #[test]
    fn hunter_backlash_shrinks_cooldown() {
        let mut sector = sector(2);
        let mut w = warden(&mut sector.rng);
        at(&mut sector, 5_000);
        w.backlash(BacklashTarget::Hunter, 0.5, &mut sector);
        assert_eq!(w.cooldown_ms(), 8_000);
        assert_eq!(w.next_event_at(), 6_000);
        w.backlash(BacklashTarget::Hunter, 0.5, &mut sector);
        w.backlash(BacklashTarget::Hunter, 0.5, &mut sector);
        assert_eq!(w.cooldown_ms(), 4_000);
    }

    #[test]
    fn player_backlash_deploys_hunter() {
        let mut sector = sector(0);
        let mut w = warden(&mut sector.rng);
        w.backlash(BacklashTarget::Player, 2.0, &mut sector);
        assert_eq!(sector.hunters.len(), 1);
        let texts: Vec<&str> = sector.effects.popups().iter().map(|p| p.text.as_str()).collect();
        assert!(texts.contains(&"BACKLASH: Threat signature amplified. Hunter deployed."));
        assert!(sector.effects.glitch.is_active() || sector.effects.cues.count_sound("glitch") > 0);
    }

    #[test]
    fn harmless_backlash_only_warns() {
        let mut sector = sector(0);
        let mut w = warden(&mut sector.rng);
        w.backlash(BacklashTarget::Player, 0.5, &mut sector);
        assert!(sector.hunters.is_empty());
        assert_eq!(sector.effects.popups().len(), 1);
        assert_eq!(w.cooldown_ms(), 12_000);
    }

    proptest! {
        #[test]
        fn selection_respects_gating(seed in any::<u64>(), chapter in 0usize..5, privilege in 0u32..4) {
            let mut rng = StdRng::seed_from_u64(seed);
            let w = Warden::new(
                &SimConfig::default().with_special_chances(0.3, 0.3),
                0,
                &mut rng,
            );
            for _ in 0..50 {
                let event = w.select(chapter, privilege, &mut rng);
                prop_assert!(event.is_available(chapter, privilege), "{event} at ch{chapter} p{privilege}");
            }
        }
    }
}
