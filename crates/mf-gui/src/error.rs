//! Error types for the front end.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for front-end operations.
pub type GuiResult<T> = Result<T, GuiError>;

/// Failures the front end reports and survives.
#[derive(Debug, Error)]
pub enum GuiError {
    /// Reading or writing a file failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// Settings JSON could not be encoded or decoded.
    #[error("settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Campaign content was unusable.
    #[error("content: {0}")]
    Content(#[from] mf_core::CoreError),

    /// The simulation refused a request.
    #[error("simulation: {0}")]
    Simulation(#[from] mf_simulation::SimError),
}
