//! Tick-based scene simulation for Mindfall.
//!
//! A [`Scene`] owns one live chapter: the player, walls, interactive objects,
//! hunters, lighting, visual effects and the per-level ledger, all gathered in
//! a [`Sector`]. The [`Warden`] director borrows the sector each tick to inject
//! hostile events. All time is derived from a [`SimClock`] so runs replay
//! exactly from a seed.

/// Chapter progression.
pub mod campaign;
/// Monotonic tick clock.
pub mod clock;
/// Scene and director configuration.
pub mod config;
/// The Warden event director.
pub mod director;
/// Transient visual-effect state.
pub mod effects;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// Light sources.
pub mod lighting;
/// Player and hunter movement with axis-separated collision.
pub mod movement;
/// Digital rain particles.
pub mod rain;
/// Level orchestration.
pub mod scene;
/// Shared mutable level state.
pub mod sector;

pub use campaign::{Advance, LevelManager};
pub use clock::SimClock;
pub use config::SimConfig;
pub use director::{BacklashTarget, Warden, WardenEvent};
pub use effects::Effects;
pub use error::{SimError, SimResult};
pub use event::{EventLog, SimEvent, SimEventKind};
pub use movement::{Hunter, MoveInput, Player};
pub use scene::{Scene, SceneOptions, SceneRequest};
pub use sector::Sector;
