//! Local profile storage — a session's durable identity.
//!
//! DESIGN
//! ======
//! Mirrors browser local storage: string keys and values, surviving
//! reloads within one profile but distinct across devices. Reads and
//! writes are fail-soft; identity resolution must never block startup.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use tracing::warn;

/// Profile key holding the durable session id.
pub const SESSION_ID_KEY: &str = "session_id";

/// Profile key holding the display name set at login.
pub const DISPLAY_NAME_KEY: &str = "display_name";

/// Persistent key/value store scoped to one browser-profile analog.
pub trait ProfileStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

// =============================================================================
// MEMORY PROFILE
// =============================================================================

/// Volatile profile for tests and simulations.
#[derive(Default)]
pub struct MemoryProfile {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryProfile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A profile pre-seeded with a display name, as the login flow would
    /// leave it.
    #[must_use]
    pub fn with_display_name(name: &str) -> Self {
        let profile = Self::new();
        profile.set(DISPLAY_NAME_KEY, name);
        profile
    }
}

impl ProfileStore for MemoryProfile {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
    }
}

// =============================================================================
// FILE PROFILE
// =============================================================================

/// JSON-file-backed profile. Writes through on every `set`.
pub struct FileProfile {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FileProfile {
    /// Open a profile file, loading existing values. A missing or corrupt
    /// file starts empty rather than failing.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = std::fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str::<HashMap<String, String>>(&text).ok())
            .unwrap_or_default();
        Self { path, values: Mutex::new(values) }
    }

    fn flush(&self, values: &HashMap<String, String>) {
        let Ok(json) = serde_json::to_string_pretty(values) else {
            return;
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            warn!(path = %self.path.display(), error = %e, "profile write failed");
        }
    }
}

impl ProfileStore for FileProfile {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_owned(), value.to_owned());
        self.flush(&values);
    }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
