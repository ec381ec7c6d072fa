//! Per-level progress flags.
//!
//! A fresh [`Ledger`] is created every time a level loads. Setting a key to
//! the value it already holds is a no-op: no change is recorded and nothing
//! is logged. Every real change is kept in an internal queue that callers can
//! drain for telemetry.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Key set once the backup power conduit has been re-routed.
pub const POWER_RESTORED: &str = "power_restored";
/// Key set once the quarantine door has been unlocked from the terminal.
pub const DOOR_UNLOCKED: &str = "door_unlocked";
/// Count of memory codes integrated so far.
pub const PRIVILEGE_LEVEL: &str = "privilege_level";

/// Privilege needed before `unlock` disengages the door.
pub const UNLOCK_PRIVILEGE: u32 = 3;

/// A ledger value: either a flag or a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LedgerValue {
    /// Boolean flag.
    Flag(bool),
    /// Non-negative counter.
    Count(u32),
}

impl LedgerValue {
    /// Interpret the value as a flag. Counters are true when non-zero.
    pub fn as_flag(&self) -> bool {
        match self {
            Self::Flag(b) => *b,
            Self::Count(n) => *n > 0,
        }
    }

    /// Interpret the value as a counter. Flags map to 0 or 1.
    pub fn as_count(&self) -> u32 {
        match self {
            Self::Flag(b) => u32::from(*b),
            Self::Count(n) => *n,
        }
    }
}

impl From<bool> for LedgerValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<u32> for LedgerValue {
    fn from(n: u32) -> Self {
        Self::Count(n)
    }
}

impl fmt::Display for LedgerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Count(n) => write!(f, "{n}"),
        }
    }
}

/// A recorded transition of one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerChange {
    /// The key that changed.
    pub key: String,
    /// Value before the change, `None` if the key was unset.
    pub old: Option<LedgerValue>,
    /// Value after the change.
    pub new: LedgerValue,
}

/// Key/value progress store for a single level instance.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    values: BTreeMap<String, LedgerValue>,
    changes: Vec<LedgerChange>,
}

/// The flag key tracking whether a puzzle has been solved.
pub fn solved_key(puzzle_id: &str) -> String {
    format!("{puzzle_id}_solved")
}

impl Ledger {
    /// Create a ledger seeded with the standard vocabulary and one solved
    /// flag per puzzle id. Seeding does not count as a change.
    pub fn new<I, S>(puzzle_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = BTreeMap::new();
        values.insert(POWER_RESTORED.to_string(), LedgerValue::Flag(false));
        values.insert(DOOR_UNLOCKED.to_string(), LedgerValue::Flag(false));
        values.insert(PRIVILEGE_LEVEL.to_string(), LedgerValue::Count(0));
        for id in puzzle_ids {
            values.insert(solved_key(id.as_ref()), LedgerValue::Flag(false));
        }
        Self {
            values,
            changes: Vec::new(),
        }
    }

    /// Read a key. Unknown keys yield `None`.
    pub fn get(&self, key: &str) -> Option<LedgerValue> {
        self.values.get(key).copied()
    }

    /// Read a key as a flag, treating unset keys as `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| v.as_flag())
    }

    /// Current privilege level.
    pub fn privilege(&self) -> u32 {
        self.get(PRIVILEGE_LEVEL).map_or(0, |v| v.as_count())
    }

    /// Whether backup power has been restored.
    pub fn power_restored(&self) -> bool {
        self.flag(POWER_RESTORED)
    }

    /// Whether the quarantine door is unlocked.
    pub fn door_unlocked(&self) -> bool {
        self.flag(DOOR_UNLOCKED)
    }

    /// Whether the given puzzle has been solved.
    pub fn is_solved(&self, puzzle_id: &str) -> bool {
        self.flag(&solved_key(puzzle_id))
    }

    /// Set a key. Returns `true` if the stored value changed.
    pub fn set(&mut self, key: &str, value: impl Into<LedgerValue>) -> bool {
        let value = value.into();
        let old = self.values.get(key).copied();
        if old == Some(value) {
            return false;
        }
        tracing::info!(key, %value, "ledger state change");
        self.values.insert(key.to_string(), value);
        self.changes.push(LedgerChange {
            key: key.to_string(),
            old,
            new: value,
        });
        true
    }

    /// Raise the privilege level by one and return the new level.
    pub fn increment_privilege(&mut self) -> u32 {
        let next = self.privilege() + 1;
        self.set(PRIVILEGE_LEVEL, next);
        tracing::info!(privilege = next, "fragmentation key re-integrated");
        next
    }

    /// Mark a puzzle solved. Returns `true` only on the first call.
    pub fn mark_solved(&mut self, puzzle_id: &str) -> bool {
        self.set(&solved_key(puzzle_id), true)
    }

    /// Changes recorded since the last drain.
    pub fn changes(&self) -> &[LedgerChange] {
        &self.changes
    }

    /// Take the recorded changes.
    pub fn drain_changes(&mut self) -> Vec<LedgerChange> {
        std::mem::take(&mut self.changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fresh_ledger_defaults() {
        let ledger = Ledger::new(["puzzle1", "puzzle2"]);
        assert_eq!(ledger.privilege(), 0);
        assert!(!ledger.door_unlocked());
        assert!(!ledger.power_restored());
        assert_eq!(ledger.get("puzzle2_solved"), Some(LedgerValue::Flag(false)));
        assert!(ledger.changes().is_empty());
    }

    #[test]
    fn unknown_key_is_unset() {
        let ledger = Ledger::new(Vec::<String>::new());
        assert_eq!(ledger.get("nonexistent"), None);
        assert!(!ledger.flag("nonexistent"));
    }

    #[test]
    fn identical_set_records_one_change() {
        let mut ledger = Ledger::new(["puzzle1"]);
        assert!(ledger.set(POWER_RESTORED, true));
        assert!(!ledger.set(POWER_RESTORED, true));
        assert_eq!(ledger.changes().len(), 1);
        assert_eq!(ledger.changes()[0].old, Some(LedgerValue::Flag(false)));
    }

    #[test]
    fn increment_privilege_counts_up() {
        let mut ledger = Ledger::new(["puzzle1"]);
        assert_eq!(ledger.increment_privilege(), 1);
        assert_eq!(ledger.increment_privilege(), 2);
        assert_eq!(ledger.privilege(), 2);
        assert_eq!(ledger.drain_changes().len(), 2);
        assert!(ledger.changes().is_empty());
    }

    #[test]
    fn mark_solved_only_once() {
        let mut ledger = Ledger::new(["puzzle1"]);
        assert!(ledger.mark_solved("puzzle1"));
        assert!(!ledger.mark_solved("puzzle1"));
        assert!(ledger.is_solved("puzzle1"));
    }

    fn value_strategy() -> impl Strategy<Value = LedgerValue> {
        prop_oneof![
            any::<bool>().prop_map(LedgerValue::Flag),
            any::<u32>().prop_map(LedgerValue::Count),
        ]
    }

    proptest! {
        #[test]
        fn set_then_get_roundtrips(key in "[a-z_]{1,16}", value in value_strategy()) {
            let mut ledger = Ledger::new(["puzzle1"]);
            ledger.set(&key, value);
            prop_assert_eq!(ledger.get(&key), Some(value));
            let before = ledger.changes().len();
            prop_assert!(!ledger.set(&key, value));
            prop_assert_eq!(ledger.changes().len(), before);
        }
    }
}
