use mf_core::EntityId;

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// State-integrity violations. Callers log these and carry on.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A chapter index outside the campaign was requested.
    #[error("level index {index} is out of bounds (0..{count})")]
    LevelOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of chapters.
        count: usize,
    },

    /// An entity id is not present in the scene.
    #[error("entity not found in scene: {0}")]
    EntityNotFound(EntityId),

    /// A code fragment names a target or attribute nothing in the scene has.
    #[error("no modifiable attribute {target}.{attribute}")]
    UnknownModifier {
        /// Target name from the payload.
        target: String,
        /// Attribute name from the payload.
        attribute: String,
    },

    /// A hunter modifier was executed with no hunters in the sector.
    #[error("no hunters active in sector")]
    NoHunters,

    /// Campaign content could not be used.
    #[error("content error: {0}")]
    Content(#[from] mf_core::CoreError),
}
