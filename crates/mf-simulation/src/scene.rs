//! Level orchestration: one live chapter and its per-tick update order.

use mf_core::ledger::Ledger;
use mf_core::level::LevelDef;
use mf_core::{Cue, EntityId, EntityKind, FragmentCode, InteractionEffect};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::director::{BacklashTarget, Warden, WardenEvent};
use crate::error::{SimError, SimResult};
use crate::event::{EventLog, SimEventKind};
use crate::lighting::{Light, LightOwner, PLAYER_LIGHT};
use crate::movement::{MoveInput, Player, Stride};
use crate::rain::RainField;
use crate::sector::Sector;

/// Ticks without movement before a reflection may appear.
pub const REFLECTION_IDLE_TICKS: u32 = 180;
/// Per-tick chance of a reflection once idle.
pub const REFLECTION_CHANCE: f64 = 0.01;
/// Reflective surfaces further than this from the player are ignored.
pub const REFLECTION_RANGE: f32 = 120.0;

/// Front-end options that shape a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneOptions {
    /// Start with the map overlay visible.
    pub show_map: bool,
    /// Run the digital rain particles.
    pub digital_rain: bool,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            show_map: true,
            digital_rain: true,
        }
    }
}

/// A state change the scene asks the application for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneRequest {
    /// Open the terminal console.
    EnterTerminal,
    /// Move on to the next chapter.
    AdvanceChapter,
}

/// A live chapter: the sector state, its Warden, and presentation toggles.
#[derive(Debug)]
pub struct Scene {
    /// World state shared with the Warden and the console.
    pub sector: Sector,
    warden: Warden,
    level: LevelDef,
    rain: Option<RainField>,
    show_map: bool,
    prompt: Option<String>,
    interact_margin: f32,
}

impl Scene {
    /// Build the live chapter `chapter` from its static definition.
    pub fn new(
        level: &LevelDef,
        chapter: usize,
        config: &SimConfig,
        options: SceneOptions,
        clock: &SimClock,
    ) -> Self {
        let built = level.build_entities();
        let rng = StdRng::seed_from_u64(config.seed.wrapping_add(chapter as u64));
        let [x, y] = level.player.start;
        let bounds = (config.view_width, config.view_height);

        let mut sector = Sector::new(
            chapter,
            Player::new(x, y),
            built.walls,
            built.interactives,
            Ledger::new(level.puzzle_ids()),
            EventLog::new(config.max_events),
            rng,
            bounds,
            built.next_id,
        );
        sector.sync(clock);

        sector
            .lighting
            .add(Light::new(LightOwner::Player, 250.0, PLAYER_LIGHT).with_pulse(0.2, 0.05));
        let fixtures: Vec<Light> = sector.interactives.iter().filter_map(Light::for_entity).collect();
        for light in fixtures {
            sector.lighting.add(light);
        }

        let rain = options
            .digital_rain
            .then(|| RainField::new(bounds.0, bounds.1, &mut sector.rng));
        let warden = Warden::new(config, sector.now(), &mut sector.rng);
        let now = sector.now();
        sector
            .effects
            .camera
            .follow(&sector.player.rect, now, &mut sector.rng);

        tracing::info!(chapter, title = %level.title, "level loaded");
        let mut scene = Self {
            sector,
            warden,
            level: level.clone(),
            rain,
            show_map: options.show_map,
            prompt: None,
            interact_margin: config.interact_margin,
        };
        scene.refresh_prompt();
        scene
    }

    /// The static definition this scene was built from.
    pub fn level(&self) -> &LevelDef {
        &self.level
    }

    /// Zero-based chapter index.
    pub fn chapter(&self) -> usize {
        self.sector.chapter
    }

    /// Location name shown on the HUD.
    pub fn location_name(&self) -> &str {
        self.level.location_name()
    }

    /// The level's ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.sector.ledger
    }

    /// The level's ledger, mutably.
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.sector.ledger
    }

    /// The director.
    pub fn warden(&self) -> &Warden {
        &self.warden
    }

    /// Digital rain, if enabled.
    pub fn rain(&self) -> Option<&RainField> {
        self.rain.as_ref()
    }

    /// Whether the map overlay is visible.
    pub fn show_map(&self) -> bool {
        self.show_map
    }

    /// Flip the map overlay.
    pub fn toggle_map(&mut self) {
        self.show_map = !self.show_map;
    }

    /// Prompt for the nearest interactable in reach.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Start ambient audio and restore anything that outlives a visit to the
    /// terminal.
    pub fn enter(&mut self) {
        let cues = &mut self.sector.effects.cues;
        cues.push(Cue::music("ambient_music", 1000));
        if self.sector.ledger.power_restored() {
            cues.push(Cue::sfx_loop("powerup"));
            let conduits: Vec<EntityId> = self
                .sector
                .interactives
                .iter()
                .filter(|e| matches!(e.kind, EntityKind::PowerCable))
                .map(|e| e.id)
                .collect();
            for id in conduits {
                self.sector.lighting.activate(LightOwner::Entity(id));
            }
        }
    }

    /// Silence everything the scene started.
    pub fn exit(&mut self) {
        let cues = &mut self.sector.effects.cues;
        if self.sector.player.stop_walking() {
            cues.push(Cue::stop("walk", 0));
        }
        cues.push(Cue::stop("hum", 0));
        cues.push(Cue::stop("ambient_music", 500));
    }

    /// Advance one tick.
    ///
    /// Order: player, ambient particles and reflections, hunters, camera,
    /// glitch timers, Warden, popups, corrupted-object expiry, prompt.
    pub fn update(&mut self, input: MoveInput, clock: &SimClock) {
        self.sector.sync(clock);
        let now = self.sector.now();

        match self.sector.player.step(input, &self.sector.walls) {
            Some(Stride::Started) => self.sector.effects.cues.push(Cue::sfx_loop("walk")),
            Some(Stride::Stopped) => self.sector.effects.cues.push(Cue::stop("walk", 0)),
            None => {}
        }

        if let Some(rain) = &mut self.rain {
            rain.update(&mut self.sector.rng);
        }
        self.sector.lighting.update();
        self.update_reflections(now);
        self.sector.effects.expire_ambient(now);

        for hunter in &mut self.sector.hunters {
            hunter.update(now, &self.sector.walls, &mut self.sector.rng);
        }
        let catcher = self
            .sector
            .hunters
            .iter()
            .find(|h| h.rect.intersects(&self.sector.player.rect))
            .map(|h| h.id);
        if let Some(hunter) = catcher {
            self.caught(hunter);
        }

        self.sector
            .effects
            .camera
            .follow(&self.sector.player.rect, now, &mut self.sector.rng);
        self.sector.effects.glitch.update(now, &mut self.sector.rng);
        self.warden.tick(&mut self.sector);
        self.sector.effects.expire_popups(now);
        self.sector.effects.expire_corrupted(now);
        self.refresh_prompt();

        self.sector.prune_lights();
        self.sector.record_ledger_changes();
    }

    fn update_reflections(&mut self, now: u64) {
        if self.sector.player.idle_ticks <= REFLECTION_IDLE_TICKS
            || !self.sector.rng.random_bool(REFLECTION_CHANCE)
        {
            return;
        }
        let player = self.sector.player.rect;
        let ledger = &self.sector.ledger;
        let surface = self
            .sector
            .interactives
            .iter()
            .find(|e| e.is_reflective(ledger) && e.rect.center_distance(&player) < REFLECTION_RANGE)
            .map(|e| (e.id, e.rect));
        if let Some((id, rect)) = surface {
            tracing::debug!(%id, "reflection");
            self.sector.effects.add_reflection(id, rect, now, 1000);
            self.sector.player.idle_ticks = 0;
        }
    }

    fn caught(&mut self, hunter: EntityId) {
        let now = self.sector.now();
        tracing::warn!(%hunter, "player caught");
        let effects = &mut self.sector.effects;
        effects.add_popup(now, "SYS.WARDEN//: Threat neutralized. Resetting...", 2000);
        effects.trigger_glitch(now, 1500, 25);
        effects.start_shake(now, 1500, 10);
        self.sector.player.reset_to_start();
        self.sector.emit(
            SimEventKind::PlayerCaught { hunter },
            "player caught, position reset",
        );
    }

    fn refresh_prompt(&mut self) {
        let reach = self.sector.player.rect;
        let margin = self.interact_margin;
        let mut nearest: Option<(f32, usize)> = None;
        for (i, entity) in self.sector.interactives.iter().enumerate() {
            if !reach.intersects(&entity.rect.inflate(margin, margin)) {
                continue;
            }
            let distance = entity.rect.center_distance(&reach);
            if nearest.is_none_or(|(best, _)| distance < best) {
                nearest = Some((distance, i));
            }
        }
        self.prompt = nearest
            .and_then(|(_, i)| self.sector.interactives[i].interaction_message(&self.sector.ledger));
    }

    /// Interact with the first entity in reach, in load order.
    pub fn try_interact(&mut self, clock: &SimClock) -> Option<SceneRequest> {
        self.sector.sync(clock);
        let margin = self.interact_margin;
        let player = self.sector.player.rect;
        let index = self
            .sector
            .interactives
            .iter()
            .position(|e| player.intersects(&e.rect.inflate(margin, margin)))?;

        self.sector.effects.cues.push(Cue::sfx("interact"));
        let entity = &self.sector.interactives[index];
        let id = entity.id;
        let name = entity.name.clone();
        let effects = entity.interact(&mut self.sector.ledger);
        tracing::debug!(%id, %name, effects = effects.len(), "interact");
        self.sector
            .emit(SimEventKind::Interacted { entity: id }, format!("interacted with {name}"));

        let mut request = None;
        for effect in effects {
            if let Some(r) = self.apply_effect(id, effect) {
                request = Some(r);
            }
        }
        self.sector.record_ledger_changes();
        self.refresh_prompt();
        request
    }

    fn apply_effect(&mut self, source: EntityId, effect: InteractionEffect) -> Option<SceneRequest> {
        let now = self.sector.now();
        let fx = &mut self.sector.effects;
        match effect {
            InteractionEffect::Popup { text, duration_ms } => fx.add_popup(now, text, duration_ms),
            InteractionEffect::Glitch {
                duration_ms,
                intensity,
            } => fx.trigger_glitch(now, duration_ms, intensity),
            InteractionEffect::Shake {
                duration_ms,
                intensity,
            } => fx.start_shake(now, duration_ms, intensity),
            InteractionEffect::Sound(cue) => fx.cues.push(cue),
            InteractionEffect::CollectFragment { id, code } => {
                self.sector.fragments.collect(&id, &code);
            }
            InteractionEffect::RemoveSelf => {
                self.sector.interactives.retain(|e| e.id != source);
                self.sector.prune_lights();
            }
            InteractionEffect::ActivateLight => {
                self.sector.lighting.activate(LightOwner::Entity(source));
            }
            InteractionEffect::EnterTerminal => return Some(SceneRequest::EnterTerminal),
            InteractionEffect::AdvanceChapter => return Some(SceneRequest::AdvanceChapter),
        }
        None
    }

    /// Apply an executed fragment payload to the live world.
    ///
    /// Only `player.speed` and `hunter.speed` exist. Nothing changes on error.
    pub fn apply_modifier(&mut self, code: &FragmentCode) -> SimResult<BacklashTarget> {
        let unknown = || SimError::UnknownModifier {
            target: code.target.clone(),
            attribute: code.attribute.clone(),
        };
        if code.attribute != "speed" {
            return Err(unknown());
        }
        let target = BacklashTarget::from_name(&code.target).ok_or_else(unknown)?;
        match target {
            BacklashTarget::Player => self.sector.player.speed *= code.value,
            BacklashTarget::Hunter => {
                if self.sector.hunters.is_empty() {
                    return Err(SimError::NoHunters);
                }
                for hunter in &mut self.sector.hunters {
                    hunter.speed *= code.value;
                }
            }
        }
        tracing::info!(%code, "modifier applied");
        Ok(target)
    }

    /// Let the Warden punish an executed fragment.
    pub fn backlash(&mut self, target: BacklashTarget, value: f32, clock: &SimClock) {
        self.sector.sync(clock);
        self.warden.backlash(target, value, &mut self.sector);
    }

    /// Fire a specific Warden event now, bypassing the schedule.
    pub fn force_event(&mut self, event: WardenEvent, clock: &SimClock) {
        self.sector.sync(clock);
        self.warden.fire(event, &mut self.sector);
    }

    /// Consume the staged terminal interference line.
    pub fn take_interference(&mut self) -> Option<String> {
        self.warden.take_interference()
    }

    /// Whether an interference line is waiting for the console.
    pub fn has_interference(&self) -> bool {
        self.warden.interference().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_core::ledger::DOOR_UNLOCKED;

    use crate::movement::Hunter;

    const LEVEL: &str = r#"{
        "title": "Chapter 9: Test Vault",
        "intro": "",
        "player": { "start": [100, 100] },
        "walls": [[0, 0, 1280, 10], [0, 710, 1280, 10], [0, 0, 10, 720], [1270, 0, 10, 720]],
        "objects": [
            { "type": "PowerCable", "x": 140, "y": 100, "w": 20, "h": 20 },
            { "type": "Terminal", "x": 100, "y": 140, "w": 30, "h": 20 },
            { "type": "Door", "x": 600, "y": 10, "w": 60, "h": 20, "image": "door_locked", "image_unlocked": "door_unlocked" },
            { "type": "CodeFragment", "x": 800, "y": 400, "w": 40, "h": 25, "id": "frag_1", "code": "player.speed=2.0" },
            { "type": "PuzzleTerminal", "x": 300, "y": 300, "w": 30, "h": 30, "name": "Echo Terminal", "puzzle": "p1" }
        ],
        "puzzles": { "p1": { "id": "puzzle1", "question": "Q?", "answer": "echo" } },
        "terminal_files": { "log.txt": "hello" }
    }"#;

    fn level() -> LevelDef {
        serde_json::from_str(LEVEL).unwrap()
    }

    fn scene_with(config: &SimConfig) -> Scene {
        Scene::new(
            &level(),
            0,
            config,
            SceneOptions {
                show_map: true,
                digital_rain: false,
            },
            &SimClock::default(),
        )
    }

    fn scene() -> Scene {
        scene_with(&SimConfig::default())
    }

    fn place_player(scene: &mut Scene, x: f32, y: f32) {
        scene.sector.player.rect.x = x;
        scene.sector.player.rect.y = y;
    }

    #[test]
    fn fresh_scene_defaults() {
        let scene = scene();
        assert_eq!(scene.ledger().privilege(), 0);
        assert!(!scene.ledger().door_unlocked());
        assert_eq!(scene.location_name(), "Test Vault");
        assert_eq!(scene.sector.interactives.len(), 5);
        // player, terminal, conduit (dormant), fragment, puzzle terminal
        assert_eq!(scene.sector.lighting.all().len(), 5);
        assert_eq!(scene.sector.lighting.active().count(), 4);
        assert!(scene.rain().is_none());
    }

    #[test]
    fn power_cable_hums_once() {
        let mut scene = scene();
        let clock = SimClock::default();
        assert_eq!(scene.try_interact(&clock), None);
        assert!(scene.ledger().power_restored());
        assert_eq!(scene.try_interact(&clock), None);
        assert_eq!(scene.sector.effects.cues.count_sound("hum"), 1);
        assert_eq!(scene.sector.effects.cues.count_sound("interact"), 2);
        assert_eq!(scene.sector.lighting.active().count(), 5);
    }

    #[test]
    fn terminal_needs_power() {
        let mut scene = scene();
        let clock = SimClock::default();
        place_player(&mut scene, 100.0, 160.0);
        assert_eq!(scene.try_interact(&clock), None);
        scene.ledger_mut().set(mf_core::ledger::POWER_RESTORED, true);
        assert_eq!(scene.try_interact(&clock), Some(SceneRequest::EnterTerminal));
    }

    #[test]
    fn door_advances_only_when_unlocked() {
        let mut scene = scene();
        let clock = SimClock::default();
        place_player(&mut scene, 610.0, 30.0);
        assert_eq!(scene.try_interact(&clock), None);
        scene.ledger_mut().set(DOOR_UNLOCKED, true);
        assert_eq!(scene.try_interact(&clock), Some(SceneRequest::AdvanceChapter));
        assert_eq!(scene.try_interact(&clock), Some(SceneRequest::AdvanceChapter));
    }

    #[test]
    fn fragment_pickup_removes_entity_and_light() {
        let mut scene = scene();
        let clock = SimClock::default();
        place_player(&mut scene, 760.0, 400.0);
        scene.try_interact(&clock);
        assert_eq!(scene.sector.fragments.code("frag_1"), Some("player.speed=2.0"));
        assert_eq!(scene.sector.interactives.len(), 4);
        assert_eq!(scene.sector.lighting.all().len(), 4);
        assert_eq!(scene.try_interact(&clock), None);
    }

    #[test]
    fn nothing_in_reach() {
        let mut scene = scene();
        place_player(&mut scene, 1000.0, 600.0);
        assert_eq!(scene.try_interact(&SimClock::default()), None);
        scene.update(MoveInput::default(), &SimClock::default());
        assert_eq!(scene.prompt(), None);
        assert_eq!(scene.sector.effects.cues.count_sound("interact"), 0);
    }

    #[test]
    fn prompt_picks_nearest() {
        let mut scene = scene();
        scene.update(MoveInput::default(), &SimClock::default());
        // The terminal centre is slightly closer than the conduit's.
        assert_eq!(
            scene.prompt(),
            Some("> The screen is dead. System power is offline.")
        );
    }

    #[test]
    fn hunter_catch_resets_player() {
        let mut scene = scene();
        let mut rng = StdRng::seed_from_u64(0);
        place_player(&mut scene, 400.0, 400.0);
        scene
            .sector
            .hunters
            .push(Hunter::new(EntityId(99), 396.0, 396.0, &mut rng));
        scene.update(MoveInput::default(), &SimClock::default());
        assert_eq!((scene.sector.player.rect.x, scene.sector.player.rect.y), (100.0, 100.0));
        assert_eq!(
            scene.sector.effects.popups()[0].text,
            "SYS.WARDEN//: Threat neutralized. Resetting..."
        );
        assert_eq!(scene.sector.events.events_for_entity(EntityId(99)).len(), 1);
    }

    #[test]
    fn walking_cues_follow_strides() {
        let mut scene = scene();
        place_player(&mut scene, 500.0, 500.0);
        let clock = SimClock::default();
        let right = MoveInput {
            right: true,
            ..MoveInput::default()
        };
        scene.update(right, &clock);
        scene.update(right, &clock);
        scene.update(MoveInput::default(), &clock);
        let cues = scene.sector.effects.cues.drain();
        assert_eq!(cues.iter().filter(|c| **c == Cue::sfx_loop("walk")).count(), 1);
        assert!(cues.contains(&Cue::stop("walk", 0)));
    }

    #[test]
    fn modifiers_apply_or_leave_world_untouched() {
        let mut scene = scene();
        let doubled: FragmentCode = "player.speed=2.0".parse().unwrap();
        assert_eq!(scene.apply_modifier(&doubled).unwrap(), BacklashTarget::Player);
        assert_eq!(scene.sector.player.speed, 10.0);

        let slow: FragmentCode = "hunter.speed=0.5".parse().unwrap();
        assert!(matches!(scene.apply_modifier(&slow), Err(SimError::NoHunters)));

        let odd: FragmentCode = "door.speed=3".parse().unwrap();
        assert!(matches!(
            scene.apply_modifier(&odd),
            Err(SimError::UnknownModifier { .. })
        ));
        let odd: FragmentCode = "player.size=3".parse().unwrap();
        assert!(scene.apply_modifier(&odd).is_err());
        assert_eq!(scene.sector.player.speed, 10.0);
    }

    #[test]
    fn warden_fires_during_update() {
        let config = SimConfig::default().with_warden_timing(100, 0);
        let mut scene = scene_with(&config);
        let mut clock = SimClock::default();
        for _ in 0..10 {
            clock.advance();
            scene.update(MoveInput::default(), &clock);
        }
        let firings: Vec<_> = scene.sector.events.warden_firings().collect();
        assert_eq!(firings.len(), 1);
        assert!(firings[0].tick >= 6);
    }

    #[test]
    fn enter_restores_conduit_light() {
        let mut scene = scene();
        scene.ledger_mut().set(mf_core::ledger::POWER_RESTORED, true);
        scene.enter();
        assert_eq!(scene.sector.effects.cues.count_sound("powerup"), 1);
        assert_eq!(scene.sector.lighting.active().count(), 5);
        scene.exit();
        assert!(scene
            .sector
            .effects
            .cues
            .pending()
            .contains(&Cue::stop("hum", 0)));
    }

    #[test]
    fn map_toggles() {
        let mut scene = scene();
        assert!(scene.show_map());
        scene.toggle_map();
        assert!(!scene.show_map());
    }
}
