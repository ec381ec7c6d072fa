//! Terminal console interpreter for Mindfall.
//!
//! The console is a small line-oriented shell bound to the live
//! [`mf_simulation::Scene`]. Players integrate memory codes, unlock the
//! sector door, read recovered files and execute code fragments that bend
//! the simulation, at the price of a Warden backlash. Output is revealed by
//! a fast-forwardable typewriter.

/// The console state machine and command handlers.
pub mod console;
/// Error types for console commands.
pub mod error;
/// Submitted-command history.
pub mod history;
/// Command parsing and name resolution.
pub mod parser;
/// Character-by-character text reveal.
pub mod typewriter;

pub use console::{ConsoleKey, ConsoleRequest, Phase, TerminalConsole, prompt_for};
pub use error::{TerminalError, TerminalResult};
pub use history::History;
pub use parser::{TerminalCommand, parse_command};
pub use typewriter::Typewriter;
