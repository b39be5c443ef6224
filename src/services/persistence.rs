//! Persistence service — client-local key-value storage for the canvas layout.
//!
//! DESIGN
//! ======
//! The whole layout (canvases plus the active id) is written as one JSON blob
//! under a fixed key after every state change. Storage sits behind the
//! `KeyValueStorage` trait so the store works the same against a browser-like
//! in-memory map or a directory of files.
//!
//! The blob is wrapped as `{ "state": ..., "version": 0 }`. The version is
//! written but never checked; there is no migration path.
//!
//! ERROR HANDLING
//! ==============
//! Backends return `StorageError`. Loading treats a missing or unreadable blob
//! as "nothing persisted" and logs the reason, so a corrupt file never keeps
//! the board from starting.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::state::Canvas;

/// Version stamped into every persisted envelope.
pub const LAYOUT_VERSION: u32 = 0;

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

// =============================================================================
// STORAGE BACKENDS
// =============================================================================

/// String-keyed, string-valued storage in the manner of `localStorage`.
pub trait KeyValueStorage {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the value exists but cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the write fails.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the delete fails.
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage. Contents vanish with the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open storage rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        // Write-then-rename; readers never observe a partial blob.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// LAYOUT
// =============================================================================

/// The persisted subset of the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedLayout {
    #[serde(default)]
    pub canvases: Vec<Canvas>,
    #[serde(default)]
    pub active_canvas_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    state: PersistedLayout,
    #[serde(default)]
    version: u32,
}

/// Serialize a layout into its stored envelope.
///
/// # Errors
///
/// Returns `Serde` if serialization fails.
pub fn encode_layout(layout: &PersistedLayout) -> Result<String, StorageError> {
    let envelope = Envelope { state: layout.clone(), version: LAYOUT_VERSION };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse a stored envelope back into a layout.
///
/// # Errors
///
/// Returns `Serde` for malformed blobs.
pub fn decode_layout(raw: &str) -> Result<PersistedLayout, StorageError> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    Ok(envelope.state)
}

/// Load the layout stored under `key`, or `None` if nothing usable is there.
pub fn load_layout(storage: &dyn KeyValueStorage, key: &str) -> Option<PersistedLayout> {
    let raw = match storage.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(%key, "no persisted canvas layout");
            return None;
        }
        Err(e) => {
            warn!(error = %e, %key, "failed to read persisted canvas layout");
            return None;
        }
    };
    match decode_layout(&raw) {
        Ok(layout) => Some(layout),
        Err(e) => {
            warn!(error = %e, %key, "discarding unreadable canvas layout");
            None
        }
    }
}

/// Write `layout` under `key`.
///
/// # Errors
///
/// Returns the encoding or backend error.
pub fn save_layout(storage: &mut dyn KeyValueStorage, key: &str, layout: &PersistedLayout) -> Result<(), StorageError> {
    let raw = encode_layout(layout)?;
    storage.set_item(key, &raw)
}
