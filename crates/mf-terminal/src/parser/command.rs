//! Command parsing for console input.

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    /// List available commands.
    Help,
    /// Report privilege, door, and protocol state.
    Status,
    /// Disengage the quarantine lock.
    Unlock,
    /// Submit a memory code.
    Integrate {
        /// The submitted code, if any.
        code: Option<String>,
    },
    /// Execute a collected code fragment.
    Exec {
        /// Fragment id, if any.
        fragment: Option<String>,
    },
    /// List readable files.
    List,
    /// Print a file.
    Cat {
        /// File name, if any.
        file: Option<String>,
    },
    /// Clear the scrollback.
    Clear,
    /// Leave the console.
    Exit,
    /// Blank input.
    Empty,
    /// Unrecognized verb.
    Unknown {
        /// The verb as typed, lowercased.
        verb: String,
    },
}

impl TerminalCommand {
    /// Canonical verb for this command, if it has one.
    pub fn verb(&self) -> Option<&'static str> {
        match self {
            Self::Help => Some("help"),
            Self::Status => Some("status"),
            Self::Unlock => Some("unlock"),
            Self::Integrate { .. } => Some("integrate"),
            Self::Exec { .. } => Some("exec"),
            Self::List => Some("ls"),
            Self::Cat { .. } => Some("cat"),
            Self::Clear => Some("clear"),
            Self::Exit => Some("exit"),
            Self::Empty | Self::Unknown { .. } => None,
        }
    }
}

/// Every canonical verb, in help order.
pub const VERBS: &[&str] = &[
    "help",
    "status",
    "unlock",
    "integrate",
    "exec",
    "ls",
    "cat",
    "clear",
    "exit",
];

const HELP_VERBS: &[&str] = &["help", "?"];
const INTEGRATE_VERBS: &[&str] = &["integrate", "override"];
const LIST_VERBS: &[&str] = &["ls", "dir"];
const CLEAR_VERBS: &[&str] = &["clear", "cls"];
const EXIT_VERBS: &[&str] = &["exit", "logout", "quit"];

/// Parse one submitted line.
///
/// Only the verb is case-normalized; arguments keep their case so that
/// callers decide how to compare them.
pub fn parse_command(input: &str) -> TerminalCommand {
    let mut words = input.split_whitespace();
    let Some(first) = words.next() else {
        return TerminalCommand::Empty;
    };
    let verb = first.to_lowercase();
    let arg = words.next().map(str::to_string);
    let verb = verb.as_str();

    if HELP_VERBS.contains(&verb) {
        return TerminalCommand::Help;
    }
    if INTEGRATE_VERBS.contains(&verb) {
        return TerminalCommand::Integrate { code: arg };
    }
    if LIST_VERBS.contains(&verb) {
        return TerminalCommand::List;
    }
    if CLEAR_VERBS.contains(&verb) {
        return TerminalCommand::Clear;
    }
    if EXIT_VERBS.contains(&verb) {
        return TerminalCommand::Exit;
    }

    match verb {
        "status" => TerminalCommand::Status,
        "unlock" => TerminalCommand::Unlock,
        "exec" => TerminalCommand::Exec { fragment: arg },
        "cat" => TerminalCommand::Cat { file: arg },
        _ => TerminalCommand::Unknown {
            verb: verb.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_verbs() {
        assert_eq!(parse_command("help"), TerminalCommand::Help);
        assert_eq!(parse_command("?"), TerminalCommand::Help);
        assert_eq!(parse_command("status"), TerminalCommand::Status);
        assert_eq!(parse_command("unlock"), TerminalCommand::Unlock);
        assert_eq!(parse_command("ls"), TerminalCommand::List);
        assert_eq!(parse_command("dir"), TerminalCommand::List);
        assert_eq!(parse_command("cls"), TerminalCommand::Clear);
        assert_eq!(parse_command("logout"), TerminalCommand::Exit);
    }

    #[test]
    fn verb_is_case_insensitive() {
        assert_eq!(parse_command("  UNLOCK  "), TerminalCommand::Unlock);
        assert_eq!(parse_command("Exit"), TerminalCommand::Exit);
    }

    #[test]
    fn integrate_and_override_are_synonyms() {
        let expected = TerminalCommand::Integrate {
            code: Some("Echo".to_string()),
        };
        assert_eq!(parse_command("integrate Echo"), expected);
        assert_eq!(parse_command("OVERRIDE Echo"), expected);
    }

    #[test]
    fn missing_arguments_are_none() {
        assert_eq!(
            parse_command("exec"),
            TerminalCommand::Exec { fragment: None }
        );
        assert_eq!(parse_command("cat"), TerminalCommand::Cat { file: None });
        assert_eq!(
            parse_command("integrate"),
            TerminalCommand::Integrate { code: None }
        );
    }

    #[test]
    fn only_first_argument_is_kept() {
        assert_eq!(
            parse_command("cat log.txt extra"),
            TerminalCommand::Cat {
                file: Some("log.txt".to_string())
            }
        );
    }

    #[test]
    fn blank_and_unknown() {
        assert_eq!(parse_command("   "), TerminalCommand::Empty);
        assert_eq!(
            parse_command("Dance now"),
            TerminalCommand::Unknown {
                verb: "dance".to_string()
            }
        );
    }

    #[test]
    fn canonical_verbs_round_trip() {
        for verb in VERBS {
            let command = parse_command(verb);
            assert_eq!(command.verb(), Some(*verb));
        }
    }
}
