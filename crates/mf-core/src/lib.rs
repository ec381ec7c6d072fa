//! Core types for Mindfall: the progress ledger, the entity model, level data,
//! and the code-fragment registry.
//!
//! Nothing here knows about time, randomness, or rendering. Entities describe
//! what an interaction *would* do as a list of [`InteractionEffect`] values;
//! the simulation crate decides when and how those effects are applied.

/// Sound and speech requests queued for the front end.
pub mod cue;
/// Entity variants, identifiers, and the interaction contract.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Collected code fragments and their executable payloads.
pub mod fragment;
/// Axis-aligned rectangles.
pub mod geometry;
/// Per-level progress flags.
pub mod ledger;
/// Level and campaign content loaded from data.
pub mod level;

/// Re-export cue types.
pub use cue::{Channel, Cue, CueQueue};
/// Re-export core entity types.
pub use entity::{Entity, EntityId, EntityKind, InteractionEffect, MapGlyph};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export fragment types.
pub use fragment::{FragmentCode, FragmentRegistry};
/// Re-export geometry types.
pub use geometry::Rect;
/// Re-export ledger types.
pub use ledger::{Ledger, LedgerChange, LedgerValue};
/// Re-export level content types.
pub use level::{Campaign, LevelDef, ObjectDef, ObjectType, PuzzleDef, StoryLine};
