use std::fmt;

use crate::cue::Cue;
use crate::geometry::Rect;
use crate::ledger::{DOOR_UNLOCKED, Ledger, POWER_RESTORED};

/// Identifier for every entity spawned into a scene. Assigned in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of world object kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    /// Passive collider.
    Wall,
    /// Quarantine door, opens once `door_unlocked` is set.
    Door {
        /// Image key used once unlocked.
        image_unlocked: Option<String>,
    },
    /// Main terminal; needs power before it can be used.
    Terminal,
    /// Backup power conduit. One-shot.
    PowerCable,
    /// A riddle station. Solved only through the terminal console.
    PuzzleTerminal {
        /// Puzzle identifier, also the ledger key stem.
        puzzle_id: String,
        /// The riddle.
        question: String,
        /// Expected answer.
        answer: String,
    },
    /// Flavor text.
    NoticeBoard {
        /// Text shown when read.
        message: String,
    },
    /// Flavor text with a glitch on read.
    CorruptedDataLog {
        /// Text shown when examined.
        message: String,
    },
    /// Collectible payload executable from the terminal.
    CodeFragment {
        /// Registry key.
        fragment_id: String,
        /// `target.attr=value` payload.
        code: String,
    },
}

/// What an entity looks like on the sector map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapGlyph {
    /// Wall segment.
    Wall,
    /// Quarantine door.
    Door,
    /// Main terminal.
    Terminal,
    /// Puzzle terminal.
    Puzzle,
    /// Code fragment.
    Fragment,
    /// Roaming hostile.
    Hostile,
    /// Anything else.
    Generic,
}

/// A side effect requested by an interaction, applied by the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEffect {
    /// Show a centred popup.
    Popup {
        /// Popup text.
        text: String,
        /// Lifetime in milliseconds.
        duration_ms: u64,
    },
    /// Start a screen glitch.
    Glitch {
        /// Lifetime in milliseconds.
        duration_ms: u64,
        /// Glitch strength.
        intensity: u32,
    },
    /// Shake the camera.
    Shake {
        /// Lifetime in milliseconds.
        duration_ms: u64,
        /// Max jitter in world units.
        intensity: u32,
    },
    /// Play a sound.
    Sound(Cue),
    /// Store a code fragment in the registry.
    CollectFragment {
        /// Fragment id.
        id: String,
        /// Payload.
        code: String,
    },
    /// Remove the interacted entity from the scene.
    RemoveSelf,
    /// Switch on the entity's dormant light.
    ActivateLight,
    /// Ask the application to open the terminal console.
    EnterTerminal,
    /// Ask the level manager to advance to the next chapter.
    AdvanceChapter,
}

fn popup(text: impl Into<String>, seconds: u64) -> InteractionEffect {
    InteractionEffect::Popup {
        text: text.into(),
        duration_ms: seconds * 1000,
    }
}

/// A live world object.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Unique id within the scene.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// World-space bounds.
    pub rect: Rect,
    /// Image key, `None` renders a placeholder.
    pub image: Option<String>,
    /// Variant data.
    pub kind: EntityKind,
}

impl Entity {
    /// Create an entity with the default display name for its kind.
    pub fn new(id: EntityId, rect: Rect, kind: EntityKind) -> Self {
        let name = match &kind {
            EntityKind::Wall => "wall",
            EntityKind::Door { .. } => "Quarantine Door",
            EntityKind::Terminal => "ChronoSyn terminal",
            EntityKind::PowerCable => "backup power conduit",
            EntityKind::PuzzleTerminal { .. } => "puzzle terminal",
            EntityKind::NoticeBoard { .. } => "corporate notice board",
            EntityKind::CorruptedDataLog { .. } => "corrupted data log",
            EntityKind::CodeFragment { .. } => "Code Fragment",
        };
        Self {
            id,
            name: name.to_string(),
            rect,
            image: None,
            kind,
        }
    }

    /// Override the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the image key.
    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    /// Everything but walls can be interacted with.
    pub fn is_interactive(&self) -> bool {
        !matches!(self.kind, EntityKind::Wall)
    }

    /// Glyph drawn for this entity on the sector map.
    pub fn map_glyph(&self) -> MapGlyph {
        match self.kind {
            EntityKind::Wall => MapGlyph::Wall,
            EntityKind::Door { .. } => MapGlyph::Door,
            EntityKind::Terminal => MapGlyph::Terminal,
            EntityKind::PuzzleTerminal { .. } => MapGlyph::Puzzle,
            EntityKind::CodeFragment { .. } => MapGlyph::Fragment,
            EntityKind::PowerCable
            | EntityKind::NoticeBoard { .. }
            | EntityKind::CorruptedDataLog { .. } => MapGlyph::Generic,
        }
    }

    /// Whether a dead screen on this entity can show a reflection.
    pub fn is_reflective(&self, ledger: &Ledger) -> bool {
        match &self.kind {
            EntityKind::Terminal => !ledger.power_restored(),
            EntityKind::PuzzleTerminal { puzzle_id, .. } => ledger.is_solved(puzzle_id),
            _ => false,
        }
    }

    /// Image key to draw given the current progress.
    pub fn current_image(&self, ledger: &Ledger) -> Option<&str> {
        match &self.kind {
            EntityKind::Door {
                image_unlocked: Some(unlocked),
            } if ledger.door_unlocked() => Some(unlocked.as_str()),
            _ => self.image.as_deref(),
        }
    }

    /// The prompt shown while the player stands next to this entity.
    ///
    /// Walls have no prompt.
    pub fn interaction_message(&self, ledger: &Ledger) -> Option<String> {
        let text = match &self.kind {
            EntityKind::Wall => return None,
            EntityKind::CodeFragment { fragment_id, .. } => {
                format!("> A corrupted data chip lies here. ID: {fragment_id}. [E] to acquire.")
            }
            EntityKind::NoticeBoard { .. } => {
                "> A flickering ChronoSyn notice board. [E] to read.".to_string()
            }
            EntityKind::CorruptedDataLog { .. } => {
                "> A data log, bleeding static. [E] to examine.".to_string()
            }
            EntityKind::PuzzleTerminal { puzzle_id, .. } => {
                if ledger.is_solved(puzzle_id) {
                    format!("The {} is inert. A memory re-integrated.", self.name)
                } else {
                    format!("> A flickering {}. [E] to access memory fragment.", self.name)
                }
            }
            EntityKind::Door { .. } => {
                if ledger.door_unlocked() {
                    "The final door is unlocked. [E] to proceed to the next sector.".to_string()
                } else {
                    "> Quarantine lock active. Requires 3 Fragmentation Keys.".to_string()
                }
            }
            EntityKind::Terminal => {
                if ledger.power_restored() {
                    "The terminal hums with quarantined power. [E] to access.".to_string()
                } else {
                    "> The screen is dead. System power is offline.".to_string()
                }
            }
            EntityKind::PowerCable => {
                if ledger.power_restored() {
                    "The conduit is humming, powering the local grid.".to_string()
                } else {
                    "> A damaged power conduit. It seems to lead to a backup generator. [E] to re-route power."
                        .to_string()
                }
            }
        };
        Some(text)
    }

    /// Perform the interaction. Only ledger mutation happens here; every
    /// other consequence is returned for the scene to apply.
    pub fn interact(&self, ledger: &mut Ledger) -> Vec<InteractionEffect> {
        match &self.kind {
            EntityKind::Wall => Vec::new(),
            EntityKind::CodeFragment { fragment_id, code } => vec![
                InteractionEffect::CollectFragment {
                    id: fragment_id.clone(),
                    code: code.clone(),
                },
                popup(format!("Code Fragment '{fragment_id}' acquired."), 3),
                InteractionEffect::RemoveSelf,
                InteractionEffect::Sound(Cue::sfx("powerup")),
            ],
            EntityKind::NoticeBoard { message } => vec![popup(message.clone(), 6)],
            EntityKind::CorruptedDataLog { message } => vec![
                popup(message.clone(), 5),
                InteractionEffect::Glitch {
                    duration_ms: 500,
                    intensity: 10,
                },
            ],
            EntityKind::PuzzleTerminal {
                puzzle_id,
                question,
                ..
            } => {
                if ledger.is_solved(puzzle_id) {
                    vec![popup(
                        format!("The {} is inert. A memory re-integrated.", self.name),
                        3,
                    )]
                } else {
                    vec![popup(format!("Memory Fragment Recovery: {question}"), 8)]
                }
            }
            EntityKind::Door { .. } => {
                if ledger.flag(DOOR_UNLOCKED) {
                    vec![InteractionEffect::AdvanceChapter]
                } else {
                    Vec::new()
                }
            }
            EntityKind::Terminal => {
                if ledger.power_restored() {
                    vec![InteractionEffect::EnterTerminal]
                } else {
                    vec![popup("No power to the terminal.", 2)]
                }
            }
            EntityKind::PowerCable => {
                if !ledger.set(POWER_RESTORED, true) {
                    return Vec::new();
                }
                vec![
                    InteractionEffect::ActivateLight,
                    popup(
                        "You re-routed the conduit. A low, painful hum fills the sector.",
                        4,
                    ),
                    InteractionEffect::Glitch {
                        duration_ms: 1000,
                        intensity: 15,
                    },
                    InteractionEffect::Shake {
                        duration_ms: 1000,
                        intensity: 5,
                    },
                    InteractionEffect::Sound(Cue::sfx_loop("hum")),
                ]
            }
        }
    }
}
