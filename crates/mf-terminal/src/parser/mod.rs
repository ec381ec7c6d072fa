//! Command parsing and name resolution.

mod command;
mod resolver;

pub use command::{TerminalCommand, VERBS, parse_command};
pub use resolver::{resolve_file, suggest_command};
