//! Light sources keyed by the entity that owns them.
//!
//! Lights never hold a reference to their owner. The scene prunes lights
//! whose owner has left the world.

use mf_core::{Entity, EntityId, EntityKind};

/// Light colour of the player and neutral fixtures.
pub const PLAYER_LIGHT: [u8; 3] = [70, 160, 180];
/// Light colour of hunters.
pub const HUNTER_LIGHT: [u8; 3] = [220, 40, 40];

/// Who a light follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightOwner {
    /// The player.
    Player,
    /// A world entity or hunter.
    Entity(EntityId),
}

/// A pulsing radial light.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Owner.
    pub owner: LightOwner,
    /// Radius in world units.
    pub radius: f32,
    /// RGB colour.
    pub color: [u8; 3],
    /// Pulse amplitude as a fraction of the base intensity.
    pub pulse_intensity: f32,
    /// Pulse phase advance per tick (radians).
    pub pulse_speed: f32,
    /// Dormant lights are kept but not drawn.
    pub active: bool,
    phase: f32,
}

impl Light {
    /// An active light.
    pub fn new(owner: LightOwner, radius: f32, color: [u8; 3]) -> Self {
        Self {
            owner,
            radius,
            color,
            pulse_intensity: 0.1,
            pulse_speed: 0.05,
            active: true,
            phase: 0.0,
        }
    }

    /// Set the pulse.
    pub fn with_pulse(mut self, intensity: f32, speed: f32) -> Self {
        self.pulse_intensity = intensity;
        self.pulse_speed = speed;
        self
    }

    /// Start dormant.
    pub fn dormant(mut self) -> Self {
        self.active = false;
        self
    }

    /// Brightness multiplier for the current pulse phase.
    pub fn brightness(&self) -> f32 {
        1.0 - self.pulse_intensity * (0.5 + 0.5 * self.phase.sin())
    }

    /// The fixture light for an entity kind, if it has one.
    pub fn for_entity(entity: &Entity) -> Option<Self> {
        let owner = LightOwner::Entity(entity.id);
        match entity.kind {
            EntityKind::Terminal => {
                Some(Self::new(owner, 180.0, [80, 180, 130]).with_pulse(0.4, 0.03))
            }
            EntityKind::PuzzleTerminal { .. } => {
                Some(Self::new(owner, 150.0, [150, 100, 200]).with_pulse(0.3, 0.02))
            }
            EntityKind::CodeFragment { .. } => {
                Some(Self::new(owner, 80.0, [180, 180, 220]).with_pulse(0.8, 0.1))
            }
            EntityKind::PowerCable => Some(
                Self::new(owner, 200.0, [200, 180, 100])
                    .with_pulse(0.6, 0.1)
                    .dormant(),
            ),
            _ => None,
        }
    }
}

/// All lights in a scene plus the ambient darkness level.
#[derive(Debug, Clone)]
pub struct Lighting {
    /// Darkness alpha applied outside lights.
    pub ambient_darkness: u8,
    lights: Vec<Light>,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient_darkness: 235,
            lights: Vec::new(),
        }
    }
}

impl Lighting {
    /// Add a light.
    pub fn add(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Switch on every light owned by `owner`. Returns `true` if one was found.
    pub fn activate(&mut self, owner: LightOwner) -> bool {
        let mut found = false;
        for light in self.lights.iter_mut().filter(|l| l.owner == owner) {
            light.active = true;
            found = true;
        }
        found
    }

    /// Drop lights whose owner no longer exists.
    pub fn retain_owners(&mut self, mut alive: impl FnMut(LightOwner) -> bool) {
        self.lights.retain(|l| alive(l.owner));
    }

    /// Advance pulse phases.
    pub fn update(&mut self) {
        for light in &mut self.lights {
            light.phase = (light.phase + light.pulse_speed) % std::f32::consts::TAU;
        }
    }

    /// Lights that should be drawn.
    pub fn active(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter().filter(|l| l.active)
    }

    /// All lights, dormant ones included.
    pub fn all(&self) -> &[Light] {
        &self.lights
    }
}
