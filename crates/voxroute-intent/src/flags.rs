//! Persisted flag gate.
//!
//! The routing engine reads a few opaque flags ("is walkthrough autoplay
//! enabled", "has the intro played") through [`FlagStore`].  It never writes
//! them and does not treat them as routing state.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// A stored flag value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Text(String),
}

/// Key-value store abstraction for persisted flags.
pub trait FlagStore: Send + Sync {
    fn get(&self, key: &str) -> Option<FlagValue>;

    /// Boolean view of a flag.  Text values `"true"`/`"false"` are accepted.
    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            FlagValue::Bool(b) => Some(b),
            FlagValue::Text(s) => s.parse().ok(),
        }
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            FlagValue::Bool(b) => Some(b.to_string()),
            FlagValue::Text(s) => Some(s),
        }
    }
}

/// In-memory flag store backed by [`DashMap`].  Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryFlagStore {
    inner: Arc<DashMap<String, FlagValue>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bool(&self, key: impl Into<String>, value: bool) {
        self.inner.insert(key.into(), FlagValue::Bool(value));
    }

    pub fn set_string(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), FlagValue::Text(value.into()));
    }

    pub fn remove(&self, key: &str) -> Option<FlagValue> {
        self.inner.remove(key).map(|(_, v)| v)
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Option<FlagValue> {
        self.inner.get(key).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_and_text_views() {
        let flags = MemoryFlagStore::new();
        flags.set_bool("walkthrough_autoplay", false);
        flags.set_string("intro_played", "true");
        flags.set_string("voice", "calm");

        assert_eq!(flags.get_bool("walkthrough_autoplay"), Some(false));
        assert_eq!(flags.get_bool("intro_played"), Some(true));
        assert_eq!(flags.get_bool("voice"), None);
        assert_eq!(flags.get_string("walkthrough_autoplay").as_deref(), Some("false"));
        assert_eq!(flags.get_bool("missing"), None);
    }

    #[test]
    fn clones_share_storage() {
        let flags = MemoryFlagStore::new();
        let other = flags.clone();
        other.set_bool("intro_played", true);
        assert_eq!(flags.get_bool("intro_played"), Some(true));
        assert_eq!(flags.remove("intro_played"), Some(FlagValue::Bool(true)));
        assert_eq!(other.get("intro_played"), None);
    }
}
