//! Level and campaign content.
//!
//! Content is authored as JSON. The bundled campaign is embedded at compile
//! time, but any file with the same shape can be loaded with
//! [`Campaign::from_json`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityKind};
use crate::error::{CoreError, CoreResult};
use crate::geometry::Rect;

const BUNDLED_CAMPAIGN: &str = include_str!("../content/campaign.json");

/// One line of the opening story, with an optional narration clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryLine {
    /// Line text. May be empty for a pause.
    pub text: String,
    /// Sound key played when the line starts typing.
    #[serde(default)]
    pub audio: Option<String>,
}

/// The full game content: story, chapters, and epilogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    /// Opening story sequence.
    pub story: Vec<StoryLine>,
    /// Instructions screen body.
    pub instructions: Vec<String>,
    /// Epilogue lines shown on the win screen.
    pub win: Vec<String>,
    /// Chapters in play order.
    pub chapters: Vec<LevelDef>,
}

impl Campaign {
    /// Parse a campaign from JSON text.
    pub fn from_json(text: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The campaign shipped with the game.
    pub fn bundled() -> CoreResult<Self> {
        Self::from_json(BUNDLED_CAMPAIGN)
    }
}

/// Player spawn data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerDef {
    /// Spawn position (top-left).
    pub start: [f32; 2],
}

/// A riddle bound to a puzzle terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleDef {
    /// Puzzle id; the ledger tracks `<id>_solved`.
    pub id: String,
    /// The riddle text.
    pub question: String,
    /// Expected answer, compared case-insensitively.
    pub answer: String,
}

/// Object descriptor types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectType {
    /// Main terminal.
    Terminal,
    /// Backup power conduit.
    PowerCable,
    /// Quarantine door.
    Door,
    /// Riddle station.
    PuzzleTerminal,
    /// Notice board.
    NoticeBoard,
    /// Corrupted data log.
    CorruptedDataLog,
    /// Collectible code fragment.
    CodeFragment,
    /// Anything the loader does not understand.
    #[serde(other)]
    Unknown,
}

impl ObjectType {
    fn label(self) -> &'static str {
        match self {
            Self::Terminal => "Terminal",
            Self::PowerCable => "PowerCable",
            Self::Door => "Door",
            Self::PuzzleTerminal => "PuzzleTerminal",
            Self::NoticeBoard => "NoticeBoard",
            Self::CorruptedDataLog => "CorruptedDataLog",
            Self::CodeFragment => "CodeFragment",
            Self::Unknown => "Unknown",
        }
    }
}

/// A world object descriptor as authored.
///
/// Type-specific fields are optional at the serde level so one bad entry
/// doesn't reject the whole file; [`LevelDef::build_entities`] validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDef {
    /// Object type.
    #[serde(rename = "type")]
    pub kind: ObjectType,
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub w: f32,
    /// Height.
    pub h: f32,
    /// Image key.
    #[serde(default)]
    pub image: Option<String>,
    /// Image key for the unlocked door.
    #[serde(default)]
    pub image_unlocked: Option<String>,
    /// Display name (puzzle terminals).
    #[serde(default)]
    pub name: Option<String>,
    /// Puzzle slot key (puzzle terminals).
    #[serde(default)]
    pub puzzle: Option<String>,
    /// Text body (notice boards, data logs).
    #[serde(default)]
    pub message: Option<String>,
    /// Fragment id (code fragments).
    #[serde(default)]
    pub id: Option<String>,
    /// Fragment payload (code fragments).
    #[serde(default)]
    pub code: Option<String>,
}

impl ObjectDef {
    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    fn require<'a>(&self, field: &'static str, value: &'a Option<String>) -> CoreResult<&'a str> {
        value.as_deref().ok_or(CoreError::MissingField {
            object: self.kind.label(),
            field,
            x: self.x,
            y: self.y,
        })
    }

    /// Resolve this descriptor into an entity kind and display name.
    pub fn to_kind(
        &self,
        puzzles: &BTreeMap<String, PuzzleDef>,
    ) -> CoreResult<(EntityKind, Option<String>)> {
        let kind = match self.kind {
            ObjectType::Terminal => EntityKind::Terminal,
            ObjectType::PowerCable => EntityKind::PowerCable,
            ObjectType::Door => EntityKind::Door {
                image_unlocked: self.image_unlocked.clone(),
            },
            ObjectType::PuzzleTerminal => {
                let slot = self.require("puzzle", &self.puzzle)?;
                let name = self.require("name", &self.name)?;
                let puzzle = puzzles
                    .get(slot)
                    .ok_or_else(|| CoreError::UnknownPuzzle(slot.to_string()))?;
                return Ok((
                    EntityKind::PuzzleTerminal {
                        puzzle_id: puzzle.id.clone(),
                        question: puzzle.question.clone(),
                        answer: puzzle.answer.clone(),
                    },
                    Some(name.to_string()),
                ));
            }
            ObjectType::NoticeBoard => EntityKind::NoticeBoard {
                message: self.require("message", &self.message)?.to_string(),
            },
            ObjectType::CorruptedDataLog => EntityKind::CorruptedDataLog {
                message: self.require("message", &self.message)?.to_string(),
            },
            ObjectType::CodeFragment => EntityKind::CodeFragment {
                fragment_id: self.require("id", &self.id)?.to_string(),
                code: self.require("code", &self.code)?.to_string(),
            },
            ObjectType::Unknown => {
                return Err(CoreError::MissingField {
                    object: "Unknown",
                    field: "type",
                    x: self.x,
                    y: self.y,
                });
            }
        };
        Ok((kind, None))
    }
}

/// Static description of one chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    /// Chapter title, e.g. "Chapter 1: The Cryo-Sanctum".
    pub title: String,
    /// Intro paragraph typed on the level intro screen.
    pub intro: String,
    /// Objective lines shown after the intro.
    #[serde(default)]
    pub objectives: Vec<String>,
    /// Player spawn.
    pub player: PlayerDef,
    /// Wall rectangles as `[x, y, w, h]`.
    pub walls: Vec<[f32; 4]>,
    /// Interactive object descriptors, in load order.
    pub objects: Vec<ObjectDef>,
    /// Puzzles keyed by slot.
    #[serde(default)]
    pub puzzles: BTreeMap<String, PuzzleDef>,
    /// Files readable from the terminal with `ls`/`cat`.
    #[serde(default)]
    pub terminal_files: BTreeMap<String, String>,
}

/// Walls and interactives built from a [`LevelDef`].
#[derive(Debug, Clone, Default)]
pub struct BuiltLevel {
    /// Wall entities.
    pub walls: Vec<Entity>,
    /// Interactive entities in descriptor order.
    pub interactives: Vec<Entity>,
    /// Next unused entity id.
    pub next_id: u32,
}

impl LevelDef {
    /// Location name: the part of the title after `": "`.
    pub fn location_name(&self) -> &str {
        self.title
            .split_once(": ")
            .map_or(self.title.as_str(), |(_, name)| name)
    }

    /// Puzzle ids in slot order.
    pub fn puzzle_ids(&self) -> Vec<String> {
        self.puzzles.values().map(|p| p.id.clone()).collect()
    }

    /// Build live entities. Descriptors that fail validation are logged and
    /// skipped so a content mistake never aborts a level load.
    pub fn build_entities(&self) -> BuiltLevel {
        let mut next_id = 0u32;
        let mut alloc = || {
            let id = EntityId(next_id);
            next_id += 1;
            id
        };

        let walls = self
            .walls
            .iter()
            .map(|[x, y, w, h]| Entity::new(alloc(), Rect::new(*x, *y, *w, *h), EntityKind::Wall))
            .collect();

        let mut interactives = Vec::with_capacity(self.objects.len());
        for def in &self.objects {
            match def.to_kind(&self.puzzles) {
                Ok((kind, name)) => {
                    let mut entity =
                        Entity::new(alloc(), def.rect(), kind).with_image(def.image.clone());
                    if let Some(name) = name {
                        entity = entity.with_name(name);
                    }
                    interactives.push(entity);
                }
                Err(e) => tracing::warn!(level = %self.title, "skipping object: {e}"),
            }
        }

        BuiltLevel {
            walls,
            interactives,
            next_id,
        }
    }
}
