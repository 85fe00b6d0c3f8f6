//! Persisted key/value state
//!
//! The recency ledger and the audio-enabled flag are persisted through the
//! [`StateStore`] capability so that callers can inject an in-memory store in
//! tests instead of touching disk.
//!
//! **Keys:**
//! - [`RECENT_KEY`]: JSON array of recently served entry ids
//! - [`AUDIO_ENABLED_KEY`]: `"1"` or `"0"`

use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Key holding the serialized recency ledger
pub const RECENT_KEY: &str = "voxline.recent.v1";

/// Key holding the audio-enabled flag
pub const AUDIO_ENABLED_KEY: &str = "voxline.audio_enabled.v1";

/// String-valued key/value persistence
pub trait StateStore: Send + Sync {
    /// Read a value (None if absent)
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value (absent keys are not an error)
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read the audio-enabled flag. Missing, unreadable or unexpected values read
/// as `false`.
pub fn load_audio_enabled(store: &dyn StateStore) -> bool {
    match store.get(AUDIO_ENABLED_KEY) {
        Ok(Some(value)) => value == "1",
        Ok(None) => false,
        Err(e) => {
            warn!("Failed to read audio-enabled flag, assuming disabled: {}", e);
            false
        }
    }
}

/// Persist the audio-enabled flag
pub fn save_audio_enabled(store: &dyn StateStore, enabled: bool) -> Result<()> {
    store.set(AUDIO_ENABLED_KEY, if enabled { "1" } else { "0" })
}

/// In-memory store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| Error::Store("memory store lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Store("memory store lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Store("memory store lock poisoned".to_string()))?;
        values.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// The whole map is rewritten on every mutation (write to a sibling temp file,
/// then rename). A missing or corrupt file opens as an empty store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(map) => {
                    debug!("Loaded {} state keys from {}", map.len(), path.display());
                    map
                }
                Err(e) => {
                    warn!(
                        "State file {} is corrupt ({}), starting with empty state",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(
                    "Failed to read state file {} ({}), starting with empty state",
                    path.display(),
                    e
                );
                BTreeMap::new()
            }
        };

        Self {
            path,
            values: Mutex::new(values),
        }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(values)
            .map_err(|e| Error::Store(format!("Failed to serialize state: {}", e)))?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl StateStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| Error::Store("state file lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Store("state file lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Store("state file lock poisoned".to_string()))?;
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}
