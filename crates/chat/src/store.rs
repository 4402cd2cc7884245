//! Key-value persistence with local-storage semantics.
//!
//! Backends only deal in strings; [`PersistentStore`] layers JSON on top
//! and turns absent or corrupt values into `None` instead of errors.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use proto::StoreError;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

/// Key holding the JSON array of all chat sessions.
pub const SESSIONS_KEY: &str = "gamechat.sessions";

/// Key holding the plain-string id of the active session.
pub const ACTIVE_KEY: &str = "gamechat.active";

/// Minimal string key-value store (browser `localStorage` shape).
pub trait KeyValueStore {
    /// Reads the raw value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

// ─── MemoryStore ─────────────────────────────────────────────

/// In-memory store for tests and ephemeral sessions.
///
/// An optional byte quota (sum of key and value lengths) mimics the host
/// quota of browser storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Creates an empty store without a quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that rejects writes beyond `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(bytes),
        }
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota
            && self.used_bytes_without(key) + key.len() + value.len() > quota
        {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

// ─── FileStore ───────────────────────────────────────────────

/// File-backed store: all keys live in one JSON object on disk.
///
/// The whole file is rewritten on every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "State file is corrupt, starting empty");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        debug!(path = %path.display(), keys = entries.len(), "File store opened");
        Self { path, entries }
    }

    /// Returns the on-disk location of this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        // Replace the file in one step so a crash never leaves it half written.
        let tmp = self.temp_path();
        std::fs::write(&tmp, content)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            // Keep the cache in step with what is actually on disk.
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

// ─── PersistentStore ─────────────────────────────────────────

/// JSON layer over a [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct PersistentStore<S> {
    backend: S,
}

impl<S: KeyValueStore> PersistentStore<S> {
    /// Wraps a raw backend.
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Loads and decodes the JSON value under `key`.
    ///
    /// Missing keys, backend read failures, and undecodable JSON all yield
    /// `None`.
    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.load_string(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Ignoring corrupt stored value");
                None
            }
        }
    }

    /// Encodes `value` as JSON and writes it under `key`.
    pub fn save_json<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let json =
            serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.backend.set(key, &json)
    }

    /// Reads the raw string under `key`; read failures are logged and yield `None`.
    pub fn load_string(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Store read failed");
                None
            }
        }
    }

    /// Writes a raw string under `key`.
    pub fn save_string(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.backend.set(key, value)
    }

    /// Deletes `key`.
    pub fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.backend.remove(key)
    }

    /// Borrows the raw backend.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Unwraps the raw backend.
    pub fn into_backend(self) -> S {
        self.backend
    }
}
