//! Diagnostic metadata attached to errors.

use serde::Serialize;
use serde_json::Value;

/// Ordered key/value bag of JSON values.
///
/// Keys keep insertion order so that error output is stable. Setting a key
/// twice replaces the earlier value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    entries: Vec<(String, Value)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a metadata bag with a single entry.
    pub fn with<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Serialize,
    {
        Self::new().and(key, value)
    }

    /// Add an entry. Values that cannot be represented as JSON are skipped.
    pub fn and<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Serialize,
    {
        if let Ok(value) = serde_json::to_value(value) {
            self.insert(key.into(), value);
        }
        self
    }

    /// Merge `other` into `self`; entries from `other` win on conflict.
    pub fn merge(mut self, other: Metadata) -> Self {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: String, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}
