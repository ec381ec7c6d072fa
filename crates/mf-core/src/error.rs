/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while reading content or parsing fragment payloads.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Level or campaign data could not be deserialized.
    #[error("invalid level data: {0}")]
    LevelData(#[from] serde_json::Error),

    /// An object descriptor is missing a field its type requires.
    #[error("{object} object at ({x}, {y}) is missing field \"{field}\"")]
    MissingField {
        /// The object type name.
        object: &'static str,
        /// The required field.
        field: &'static str,
        /// Descriptor x position, for locating the entry.
        x: f32,
        /// Descriptor y position, for locating the entry.
        y: f32,
    },

    /// A puzzle terminal references a puzzle slot the level does not define.
    #[error("unknown puzzle slot \"{0}\"")]
    UnknownPuzzle(String),

    /// A code fragment payload is not of the form `target.attr=value`.
    #[error("malformed code fragment \"{0}\"")]
    MalformedFragment(String),
}
