//! Raw key/value backends.
//!
//! A backend mirrors the host shell's synchronous storage API: every call
//! completes before it returns and leaves no pending state behind.
//!
//! `FileBackend` keeps the whole document in one JSON file and rewrites it
//! through a temp file + rename, so a crash mid-write never leaves a torn
//! document on disk.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

use super::StorageError;

/// Synchronous top-level key/value storage.
pub trait StorageBackend: Send + Sync {
    /// Read a key. `Ok(None)` when the key was never written or was deleted.
    fn read(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Replace the value stored under `key`.
    fn write(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local backend. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of top-level keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Value>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.lock().insert(key.to_owned(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// Backend persisting every key into a single JSON document.
///
/// Each call loads the document, applies one change and writes it back.
/// The internal mutex serializes callers within this process only.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileBackend {
    /// Open a backend at `path`. The file and its parent directory are
    /// created lazily on the first write.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), guard: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, Value>, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, document: &BTreeMap<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, Value>)) -> Result<(), StorageError> {
        let _held = self
            .guard
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut document = self.load()?;
        apply(&mut document);
        self.save(&document)
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let _held = self
            .guard
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn write(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.update(|document| {
            document.insert(key.to_owned(), value);
        })
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.update(|document| {
            document.remove(key);
        })
    }
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;
