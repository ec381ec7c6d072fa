//! Collected code fragments and their payloads.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Fragments picked up in the world but not yet executed.
///
/// Once a fragment is consumed its id moves to a used-set and can never be
/// collected or executed again in the same level.
#[derive(Debug, Clone, Default)]
pub struct FragmentRegistry {
    fragments: BTreeMap<String, String>,
    used: BTreeSet<String>,
}

impl FragmentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fragment. Returns `false` if the id was already consumed.
    pub fn collect(&mut self, id: &str, code: &str) -> bool {
        if self.used.contains(id) {
            tracing::warn!(id, "ignoring already consumed fragment");
            return false;
        }
        tracing::info!(id, code, "collected code fragment");
        self.fragments.insert(id.to_string(), code.to_string());
        true
    }

    /// The stored code for an unused fragment.
    pub fn code(&self, id: &str) -> Option<&str> {
        self.fragments.get(id).map(String::as_str)
    }

    /// Move a fragment to the used-set. Returns `false` if it was not held.
    pub fn consume(&mut self, id: &str) -> bool {
        if self.fragments.remove(id).is_some() {
            self.used.insert(id.to_string());
            true
        } else {
            false
        }
    }

    /// Whether the fragment has been executed.
    pub fn is_used(&self, id: &str) -> bool {
        self.used.contains(id)
    }

    /// Ids of held fragments, sorted.
    pub fn held(&self) -> impl Iterator<Item = &str> {
        self.fragments.keys().map(String::as_str)
    }

    /// Number of held fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether no fragments are held.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// A parsed `target.attribute=value` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentCode {
    /// Entity the modifier applies to, e.g. `player` or `hunter`.
    pub target: String,
    /// Attribute name, e.g. `speed`.
    pub attribute: String,
    /// Multiplicative factor.
    pub value: f32,
}

impl FromStr for FragmentCode {
    type Err = CoreError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let malformed = || CoreError::MalformedFragment(code.to_string());

        let (lhs, rhs) = code.split_once('=').ok_or_else(malformed)?;
        if rhs.contains('=') {
            return Err(malformed());
        }
        let (target, attribute) = lhs.split_once('.').ok_or_else(malformed)?;
        if attribute.contains('.') {
            return Err(malformed());
        }
        let target = target.trim();
        let attribute = attribute.trim();
        if target.is_empty() || attribute.is_empty() {
            return Err(malformed());
        }
        let value: f32 = rhs.trim().parse().map_err(|_| malformed())?;
        if !value.is_finite() {
            return Err(malformed());
        }

        Ok(Self {
            target: target.to_string(),
            attribute: attribute.to_string(),
            value,
        })
    }
}

impl fmt::Display for FragmentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}={}", self.target, self.attribute, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_and_consume() {
        let mut reg = FragmentRegistry::new();
        assert!(reg.collect("frag_101", "hunter.speed=0.5"));
        assert_eq!(reg.code("frag_101"), Some("hunter.speed=0.5"));
        assert!(reg.consume("frag_101"));
        assert_eq!(reg.code("frag_101"), None);
        assert!(reg.is_used("frag_101"));
        assert!(!reg.consume("frag_101"));
    }

    #[test]
    fn consumed_fragment_cannot_be_recollected() {
        let mut reg = FragmentRegistry::new();
        reg.collect("frag_202", "player.speed=1.5");
        reg.consume("frag_202");
        assert!(!reg.collect("frag_202", "player.speed=1.5"));
        assert!(reg.is_empty());
    }

    #[test]
    fn parse_valid_payload() {
        let code: FragmentCode = "player.speed=2.0".parse().unwrap();
        assert_eq!(code.target, "player");
        assert_eq!(code.attribute, "speed");
        assert!((code.value - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn parse_rejects_malformed_payloads() {
        for bad in [
            "player.speed",
            "player=2",
            "player.speed=fast",
            "a.b.c=1",
            "player.speed=1=2",
            ".speed=1",
            "player.speed=inf",
            "",
        ] {
            assert!(bad.parse::<FragmentCode>().is_err(), "accepted {bad:?}");
        }
    }
}
