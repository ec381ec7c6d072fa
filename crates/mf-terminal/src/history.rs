//! Submitted-command history with up/down recall.

use std::collections::VecDeque;

/// Default number of remembered commands.
pub const HISTORY_CAPACITY: usize = 32;

/// Most-recent-first command history.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    cursor: Option<usize>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl History {
    /// Create an empty history holding at most `capacity` lines.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            capacity: capacity.max(1),
        }
    }

    /// Record a submitted line. Blank lines are ignored. Resets recall.
    pub fn record(&mut self, line: &str) {
        self.cursor = None;
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        self.entries.push_front(line.to_string());
        self.entries.truncate(self.capacity);
    }

    /// Step back in time. Stays on the oldest entry once reached.
    pub fn older(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let next = match self.cursor {
            None => 0,
            Some(i) => (i + 1).min(self.entries.len() - 1),
        };
        self.cursor = Some(next);
        self.entries.get(next).map(String::as_str)
    }

    /// Step forward in time. Past the newest entry the input is blank.
    pub fn newer(&mut self) -> Option<&str> {
        match self.cursor {
            None => None,
            Some(0) => {
                self.cursor = None;
                Some("")
            }
            Some(i) => {
                self.cursor = Some(i - 1);
                self.entries.get(i - 1).map(String::as_str)
            }
        }
    }

    /// Remembered lines, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of remembered lines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recall_is_most_recent_first() {
        let mut history = History::default();
        history.record("status");
        history.record("ls");
        assert_eq!(history.older(), Some("ls"));
        assert_eq!(history.older(), Some("status"));
        assert_eq!(history.older(), Some("status"));
        assert_eq!(history.newer(), Some("ls"));
        assert_eq!(history.newer(), Some(""));
        assert_eq!(history.newer(), None);
    }

    #[test]
    fn blank_lines_are_not_recorded() {
        let mut history = History::default();
        history.record("   ");
        assert!(history.is_empty());
        assert_eq!(history.older(), None);
    }

    #[test]
    fn capacity_drops_oldest() {
        let mut history = History::new(2);
        history.record("a");
        history.record("b");
        history.record("c");
        let kept: Vec<_> = history.entries().collect();
        assert_eq!(kept, vec!["c", "b"]);
    }

    #[test]
    fn recording_resets_recall() {
        let mut history = History::default();
        history.record("a");
        history.record("b");
        history.older();
        history.older();
        history.record("c");
        assert_eq!(history.older(), Some("c"));
    }
}
