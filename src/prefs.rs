//! Key-value preference store.
//!
//! The scene reads `selectedTheme` once at setup and writes it back on
//! every successful theme switch, so the chosen backdrop survives
//! restarts. Preferences are never required: a missing or unreadable
//! store degrades to the default theme.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Preference key holding the active theme name.
pub const THEME_KEY: &str = "selectedTheme";

/// A string key-value store for user preferences.
pub trait PrefStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory store, used by tests and as a fallback when no config
/// directory exists. Clones share the same underlying map, so a test can
/// keep a handle to the store it handed to a scene.
#[derive(Debug, Clone, Default)]
pub struct MemoryPrefs {
    values: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrefStore for MemoryPrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.lock().unwrap().insert(key.to_string(), value.to_string());
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PrefFile {
    #[serde(flatten)]
    values: BTreeMap<String, String>,
}

/// JSON-file-backed store. Every `set` rewrites the file; preference
/// writes are rare (one per theme switch) so there is no caching layer.
#[derive(Debug)]
pub struct JsonPrefs {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonPrefs {
    /// Open a store at `path`, loading any existing values. A missing or
    /// malformed file starts empty rather than failing setup.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<PrefFile>(&text) {
                Ok(file) => file.values,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring malformed preference file");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    /// Default location under the user config directory, if one exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("nocturne").join("prefs.json"))
    }

    fn flush(&self) {
        let file = PrefFile {
            values: self.values.clone(),
        };
        let text = match serde_json::to_string_pretty(&file) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize preferences");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %e, "failed to create preference directory");
                return;
            }
        }
        if let Err(e) = std::fs::write(&self.path, text) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write preferences");
        }
    }
}

impl PrefStore for JsonPrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_roundtrip() {
        let mut prefs = MemoryPrefs::new();
        assert_eq!(prefs.get(THEME_KEY), None);
        prefs.set(THEME_KEY, "aurora");
        assert_eq!(prefs.get(THEME_KEY), Some("aurora".to_string()));
    }

    #[test]
    fn test_memory_clones_share_values() {
        let mut a = MemoryPrefs::new();
        let b = a.clone();
        a.set("k", "v");
        assert_eq!(b.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_json_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "nocturne-prefs-test-{}-roundtrip.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let mut prefs = JsonPrefs::open(&path);
        assert_eq!(prefs.get(THEME_KEY), None);
        prefs.set(THEME_KEY, "pipeline");

        let reopened = JsonPrefs::open(&path);
        assert_eq!(reopened.get(THEME_KEY), Some("pipeline".to_string()));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_json_malformed_file_starts_empty() {
        let path = std::env::temp_dir().join(format!(
            "nocturne-prefs-test-{}-malformed.json",
            std::process::id()
        ));
        std::fs::write(&path, "{not json").unwrap();
        let prefs = JsonPrefs::open(&path);
        assert_eq!(prefs.get(THEME_KEY), None);
        let _ = std::fs::remove_file(&path);
    }
}
