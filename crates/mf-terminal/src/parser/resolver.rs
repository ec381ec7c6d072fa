//! Close-match suggestions for mistyped verbs.

use strsim::jaro_winkler;

use super::command::VERBS;

/// Minimum similarity score for a suggestion (0.0-1.0).
const FUZZY_THRESHOLD: f64 = 0.8;

/// The known verb closest to `input`, if any scores above the threshold.
pub fn suggest_command(input: &str) -> Option<&'static str> {
    let input = input.to_lowercase();
    let mut best: Option<(&'static str, f64)> = None;
    for verb in VERBS {
        let score = jaro_winkler(&input, verb);
        if score >= FUZZY_THRESHOLD && best.is_none_or(|(_, s)| score > s) {
            best = Some((verb, score));
        }
    }
    best.map(|(verb, _)| verb)
}

/// File names matching `input` case-insensitively.
pub fn resolve_file<'a, I>(names: I, input: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    let input = input.to_lowercase();
    names
        .into_iter()
        .find(|name| name.to_lowercase() == input)
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_verbs() {
        assert_eq!(suggest_command("stats"), Some("status"));
        assert_eq!(suggest_command("unlok"), Some("unlock"));
        assert_eq!(suggest_command("integrat"), Some("integrate"));
    }

    #[test]
    fn no_suggestion_for_distant_input() {
        assert_eq!(suggest_command("xyzzy"), None);
        assert_eq!(suggest_command("dance"), None);
    }

    #[test]
    fn file_lookup_ignores_case() {
        let names = vec!["Log_01.txt".to_string(), "memo".to_string()];
        assert_eq!(resolve_file(&names, "log_01.TXT"), Some("Log_01.txt"));
        assert_eq!(resolve_file(&names, "missing"), None);
    }
}
