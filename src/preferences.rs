use crate::session::MockSnapshot;
use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const PREFERENCES_KEY: &str = "quizState";
pub const MOCK_SNAPSHOT_KEY: &str = "mockTestState";

/// Settings that survive across sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub marked_questions: BTreeSet<String>,
    pub dark_mode: bool,
}

/// Typed access to the two persisted records. Failures are logged and
/// swallowed so a broken store never interrupts a quiz.
pub struct PreferenceStore<S: Storage> {
    storage: S,
}

impl<S: Storage> PreferenceStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn load_preferences(&self) -> Preferences {
        self.load_typed(PREFERENCES_KEY).unwrap_or_default()
    }

    pub fn save_preferences(&self, prefs: &Preferences) {
        self.save_typed(PREFERENCES_KEY, prefs);
    }

    pub fn load_snapshot(&self) -> Option<MockSnapshot> {
        self.load_typed(MOCK_SNAPSHOT_KEY)
    }

    pub fn save_snapshot(&self, snapshot: &MockSnapshot) {
        self.save_typed(MOCK_SNAPSHOT_KEY, snapshot);
    }

    pub fn clear_snapshot(&self) {
        if let Err(e) = self.storage.clear(MOCK_SNAPSHOT_KEY) {
            tracing::warn!(error = %e, "failed to clear mock snapshot");
        }
    }

    fn load_typed<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = match self.storage.load(key) {
            Ok(v) => v?,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read stored state");
                return None;
            }
        };
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored state has an unexpected shape");
                None
            }
        }
    }

    fn save_typed<T: Serialize>(&self, key: &str, record: &T) {
        let result = serde_json::to_value(record)
            .map_err(Into::into)
            .and_then(|value| self.storage.save(key, &value));
        match result {
            Ok(()) => tracing::debug!(key, "state saved"),
            Err(e) => tracing::warn!(key, error = %e, "failed to save state"),
        }
    }
}
