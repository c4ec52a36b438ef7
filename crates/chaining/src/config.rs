//! Engine configuration.

use std::time::Duration;
use tessera_core::Value;

/// How join keys and identifier values are compared. The skip log treats
/// two runs as one under the same rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyComparison {
    /// Compare canonical text forms, so `Int32(7)`, `Int64(7)` and `"7"` match.
    #[default]
    Text,
    /// Compare by type-aware ordering; numbers of any width match by magnitude
    /// but never match strings.
    Typed,
}

impl KeyComparison {
    /// Compares a join key. A null key matches nothing.
    pub fn keys_match(self, a: &Value, b: &Value) -> bool {
        if a.is_null() || b.is_null() {
            return false;
        }
        self.values_match(a, b)
    }

    /// Compares one identifier value. Null identifiers match each other.
    pub fn ids_match(self, a: &Value, b: &Value) -> bool {
        match (a.is_null(), b.is_null()) {
            (true, true) => true,
            (false, false) => self.values_match(a, b),
            _ => false,
        }
    }

    fn values_match(self, a: &Value, b: &Value) -> bool {
        match self {
            KeyComparison::Text => a.text_eq(b),
            KeyComparison::Typed => a.typed_eq(b),
        }
    }
}

/// Configuration for a [`JoiningEngine`](crate::JoiningEngine).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    key_comparison: KeyComparison,
    default_resolve_timeout: Option<Duration>,
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key comparison.
    pub fn with_key_comparison(mut self, comparison: KeyComparison) -> Self {
        self.key_comparison = comparison;
        self
    }

    /// Sets the resolve timeout used when a request enables resolution
    /// without its own timeout.
    pub fn with_default_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.default_resolve_timeout = Some(timeout);
        self
    }

    #[inline]
    pub fn key_comparison(&self) -> KeyComparison {
        self.key_comparison
    }

    #[inline]
    pub fn default_resolve_timeout(&self) -> Option<Duration> {
        self.default_resolve_timeout
    }
}
