//! Shared mutable state of one live level.
//!
//! The scene owns a [`Sector`]; the Warden and the terminal console borrow it
//! to move hunters, flip ledger flags and queue effects.

use mf_core::ledger::Ledger;
use mf_core::{Entity, EntityId, FragmentRegistry, Rect};
use rand::Rng;
use rand::rngs::StdRng;

use crate::clock::SimClock;
use crate::effects::Effects;
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::lighting::{HUNTER_LIGHT, Light, LightOwner, Lighting};
use crate::movement::{HUNTER_SIZE, Hunter, Player};

/// Hunters spawn at least this far from the player's centre.
pub const HUNTER_MIN_SPAWN_DISTANCE: f32 = 400.0;
/// Distance kept between a hunter spawn point and the world edge.
pub const HUNTER_SPAWN_INSET: f32 = 100.0;
const HUNTER_SPAWN_ATTEMPTS: usize = 64;

/// Mutable state of one level session.
///
/// Owned by the scene and lent to the Warden and the terminal console, the
/// same way systems borrow the world for one tick.
#[derive(Debug)]
pub struct Sector {
    /// Zero-based chapter index.
    pub chapter: usize,
    /// The player.
    pub player: Player,
    /// Static colliders.
    pub walls: Vec<Entity>,
    /// Interactive objects in load order.
    pub interactives: Vec<Entity>,
    /// Roaming hunters.
    pub hunters: Vec<Hunter>,
    /// Progress flags for this level.
    pub ledger: Ledger,
    /// Collected code fragments.
    pub fragments: FragmentRegistry,
    /// Transient visual effects and the cue queue.
    pub effects: Effects,
    /// Light sources.
    pub lighting: Lighting,
    /// Everything notable that happened.
    pub events: EventLog,
    /// Randomness for this session.
    pub rng: StdRng,
    bounds: (f32, f32),
    next_id: u32,
    tick: u64,
    now: u64,
}

impl Sector {
    /// Assemble a sector. `next_id` is the first id not used by the level.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chapter: usize,
        player: Player,
        walls: Vec<Entity>,
        interactives: Vec<Entity>,
        ledger: Ledger,
        events: EventLog,
        rng: StdRng,
        bounds: (f32, f32),
        next_id: u32,
    ) -> Self {
        Self {
            chapter,
            player,
            walls,
            interactives,
            hunters: Vec::new(),
            ledger,
            fragments: FragmentRegistry::new(),
            effects: Effects::new(bounds.0, bounds.1),
            lighting: Lighting::default(),
            events,
            rng,
            bounds,
            next_id,
            tick: 0,
            now: 0,
        }
    }

    /// Take the current time from the clock.
    pub fn sync(&mut self, clock: &SimClock) {
        self.tick = clock.tick();
        self.now = clock.now_ms();
    }

    /// Current time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Current tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// World size.
    pub fn bounds(&self) -> (f32, f32) {
        self.bounds
    }

    /// Emit a simulation event at the current tick.
    pub fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        self.events.push(SimEvent::new(self.tick, kind, description));
    }

    /// Hand out a fresh entity id.
    pub fn alloc_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Find an interactive by id.
    pub fn interactive(&self, id: EntityId) -> Option<&Entity> {
        self.interactives.iter().find(|e| e.id == id)
    }

    /// Whether an id belongs to anything currently in the world.
    pub fn contains(&self, id: EntityId) -> bool {
        self.walls.iter().chain(&self.interactives).any(|e| e.id == id)
            || self.hunters.iter().any(|h| h.id == id)
    }

    /// Drop lights whose owner has gone.
    pub fn prune_lights(&mut self) {
        let Self {
            lighting,
            walls,
            interactives,
            hunters,
            ..
        } = self;
        lighting.retain_owners(|owner| match owner {
            LightOwner::Player => true,
            LightOwner::Entity(id) => {
                walls.iter().chain(interactives.iter()).any(|e| e.id == id)
                    || hunters.iter().any(|h| h.id == id)
            }
        });
    }

    /// Move recorded ledger changes into the event log.
    pub fn record_ledger_changes(&mut self) {
        for change in self.ledger.drain_changes() {
            let description = format!("{} -> {}", change.key, change.new);
            self.emit(SimEventKind::LedgerChanged { key: change.key }, description);
        }
    }

    /// Spawn a hunter with its light, away from the player.
    pub fn spawn_hunter(&mut self) -> EntityId {
        let (x, y) = self.hunter_spawn_point();
        let id = self.alloc_id();
        let hunter = Hunter::new(id, x, y, &mut self.rng);
        self.hunters.push(hunter);
        self.lighting.add(
            Light::new(LightOwner::Entity(id), 300.0, HUNTER_LIGHT).with_pulse(0.5, 0.1),
        );
        tracing::info!(%id, x, y, "hunter spawned");
        self.emit(
            SimEventKind::HunterSpawned { hunter: id },
            format!("hunter spawned at ({x:.0}, {y:.0})"),
        );
        id
    }

    fn hunter_spawn_point(&mut self) -> (f32, f32) {
        let (px, py) = self.player.rect.center();
        let max_x = (self.bounds.0 - HUNTER_SPAWN_INSET).max(HUNTER_SPAWN_INSET);
        let max_y = (self.bounds.1 - HUNTER_SPAWN_INSET).max(HUNTER_SPAWN_INSET);
        let distance = |&(x, y): &(f32, f32)| (x - px).hypot(y - py);

        let mut candidates = Vec::with_capacity(HUNTER_SPAWN_ATTEMPTS + 4);
        for _ in 0..HUNTER_SPAWN_ATTEMPTS {
            let x = self.rng.random_range(HUNTER_SPAWN_INSET..=max_x).round();
            let y = self.rng.random_range(HUNTER_SPAWN_INSET..=max_y).round();
            if self.spawn_is_open(x, y) && distance(&(x, y)) >= HUNTER_MIN_SPAWN_DISTANCE {
                return (x, y);
            }
            candidates.push((x, y));
        }
        // Small or crowded worlds may have no point far enough away.
        let corners = [
            (HUNTER_SPAWN_INSET, HUNTER_SPAWN_INSET),
            (max_x, HUNTER_SPAWN_INSET),
            (HUNTER_SPAWN_INSET, max_y),
            (max_x, max_y),
        ];
        candidates.extend(corners);
        candidates
            .iter()
            .copied()
            .filter(|&(x, y)| self.spawn_is_open(x, y))
            .max_by(|a, b| distance(a).total_cmp(&distance(b)))
            .or_else(|| {
                corners
                    .into_iter()
                    .max_by(|a, b| distance(a).total_cmp(&distance(b)))
            })
            .unwrap_or((HUNTER_SPAWN_INSET, HUNTER_SPAWN_INSET))
    }

    /// Whether a hunter placed at `(x, y)` would overlap nothing solid.
    fn spawn_is_open(&self, x: f32, y: f32) -> bool {
        let rect = Rect::new(x, y, HUNTER_SIZE, HUNTER_SIZE);
        !self
            .walls
            .iter()
            .chain(&self.interactives)
            .any(|e| e.rect.intersects(&rect))
            && !self.player.rect.intersects(&rect)
            && !self.hunters.iter().any(|h| h.rect.intersects(&rect))
    }

    /// Whether `rect` overlaps anything solid other than `except`.
    pub fn is_blocked(&self, rect: &Rect, except: EntityId) -> bool {
        self.walls
            .iter()
            .chain(&self.interactives)
            .filter(|e| e.id != except)
            .any(|e| e.rect.intersects(rect))
            || self.player.rect.intersects(rect)
            || self.hunters.iter().any(|h| h.rect.intersects(rect))
    }
}
