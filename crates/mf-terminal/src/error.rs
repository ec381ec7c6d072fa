//! Error types for the console.
//!
//! Every variant renders as the exact line written to the scrollback, so the
//! console can report a failure with `to_string()`.

use thiserror::Error;

/// Result type for console commands.
pub type TerminalResult<T> = Result<T, TerminalError>;

/// User-facing console failures. None of them is fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerminalError {
    /// `unlock` without enough fragmentation keys.
    #[error("ERROR: Insufficient Fragmentation Keys. Full re-integration required.")]
    InsufficientKeys,

    /// `integrate` with no code.
    #[error("Usage: integrate <memory_code>")]
    IntegrateUsage,

    /// `integrate` with a code matching no puzzle.
    #[error("ERROR: Invalid memory code.")]
    InvalidMemoryCode,

    /// `exec` below the required privilege.
    #[error("ERROR: Command requires privilege level {required} or higher.")]
    PrivilegeRequired {
        /// Level needed.
        required: u32,
    },

    /// `exec` with no fragment id.
    #[error("Usage: exec <fragment_id>")]
    ExecUsage,

    /// `exec` on a fragment that is not held.
    #[error("ERROR: Code Fragment '{0}' not found or already used.")]
    FragmentNotFound(String),

    /// Fragment payload is not `target.attribute=value`.
    #[error("ERROR: Failed to parse code fragment '{0}'.")]
    MalformedFragment(String),

    /// Fragment names a target or attribute with no modifier.
    #[error("ERROR: Invalid target or attribute in code fragment.")]
    InvalidTarget,

    /// Hunter modifier with no hunter in the sector.
    #[error("Execution failed: No Hunters active in sector.")]
    NoHunters,

    /// `cat` with no file name.
    #[error("Usage: cat <fragment>")]
    CatUsage,

    /// `cat` on a missing file.
    #[error("ERROR: Fragment not found: '{0}'")]
    FileNotFound(String),

    /// Unrecognized verb.
    #[error("Command not recognized: '{verb}'.{}", suggestion_text(.suggestion))]
    UnknownCommand {
        /// The verb as typed.
        verb: String,
        /// Closest known verb.
        suggestion: Option<&'static str>,
    },
}

fn suggestion_text(suggestion: &Option<&'static str>) -> String {
    suggestion
        .map(|s| format!(" Did you mean '{s}'?"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_scrollback_text() {
        assert_eq!(
            TerminalError::PrivilegeRequired { required: 2 }.to_string(),
            "ERROR: Command requires privilege level 2 or higher."
        );
        assert_eq!(
            TerminalError::FileNotFound("memo".into()).to_string(),
            "ERROR: Fragment not found: 'memo'"
        );
    }

    #[test]
    fn unknown_command_with_and_without_suggestion() {
        let plain = TerminalError::UnknownCommand {
            verb: "dance".into(),
            suggestion: None,
        };
        assert_eq!(plain.to_string(), "Command not recognized: 'dance'.");

        let hinted = TerminalError::UnknownCommand {
            verb: "stats".into(),
            suggestion: Some("status"),
        };
        assert_eq!(
            hinted.to_string(),
            "Command not recognized: 'stats'. Did you mean 'status'?"
        );
    }
}
