//! Character-by-character text reveal.

use std::collections::VecDeque;

/// Default reveal delay for console output.
pub const CONSOLE_CHAR_MS: u64 = 12;

/// A resumable reveal sequence over queued lines.
///
/// Time is fed in with [`Typewriter::advance`]; completed lines are handed
/// back to the caller, the line in progress stays here until it finishes or
/// the sequence is flushed.
#[derive(Debug, Clone)]
pub struct Typewriter {
    queue: VecDeque<String>,
    revealed: usize,
    carry_ms: u64,
    char_ms: u64,
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::new(CONSOLE_CHAR_MS)
    }
}

impl Typewriter {
    /// Create an idle typewriter revealing one character every `char_ms`.
    pub fn new(char_ms: u64) -> Self {
        Self {
            queue: VecDeque::new(),
            revealed: 0,
            carry_ms: 0,
            char_ms: char_ms.max(1),
        }
    }

    /// Queue a line for reveal.
    pub fn push(&mut self, line: impl Into<String>) {
        self.queue.push_back(line.into());
    }

    /// Whether any line is still being revealed.
    pub fn is_busy(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Spend `elapsed_ms` revealing characters. Returns lines that finished.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<String> {
        let mut finished = Vec::new();
        if self.queue.is_empty() {
            self.carry_ms = 0;
            return finished;
        }
        self.carry_ms += elapsed_ms;

        while let Some(head) = self.queue.front() {
            if self.revealed >= head.chars().count() {
                if let Some(line) = self.queue.pop_front() {
                    finished.push(line);
                }
                self.revealed = 0;
                continue;
            }
            if self.carry_ms < self.char_ms {
                break;
            }
            self.carry_ms -= self.char_ms;
            self.revealed += 1;
        }

        if self.queue.is_empty() {
            self.carry_ms = 0;
        }
        finished
    }

    /// The visible prefix of the line in progress.
    pub fn partial(&self) -> Option<&str> {
        let head = self.queue.front()?;
        let end = head
            .char_indices()
            .nth(self.revealed)
            .map_or(head.len(), |(i, _)| i);
        Some(&head[..end])
    }

    /// Finish the sequence at once, returning every remaining line.
    pub fn flush(&mut self) -> Vec<String> {
        self.revealed = 0;
        self.carry_ms = 0;
        self.queue.drain(..).collect()
    }

    /// Drop everything queued.
    pub fn clear(&mut self) {
        self.flush();
    }
}
