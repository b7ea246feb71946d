//! Namespaced store for the persisted session fields.
//!
//! DESIGN
//! ======
//! All five fields live in one JSON object written under `STORAGE_NAMESPACE`,
//! so clearing the session is a single backend delete and nothing collides
//! with unrelated keys in the same backend. Every `set` reads the whole
//! object, changes one field and writes the whole object back.
//!
//! Only the recognized keys are accepted. Writes to any other key are
//! dropped without error.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{StorageBackend, StorageError};

/// Backend key holding the persisted session fields.
pub const STORAGE_NAMESPACE: &str = "storage_data";

/// The persisted subset of the session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersistedKey {
    UserId,
    UserName,
    Avatar,
    Roles,
    Permissions,
}

impl PersistedKey {
    pub const ALL: [Self; 5] = [Self::UserId, Self::UserName, Self::Avatar, Self::Roles, Self::Permissions];

    /// Storage key for this field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserId => "user_id",
            Self::UserName => "user_name",
            Self::Avatar => "user_avatar",
            Self::Roles => "user_roles",
            Self::Permissions => "user_permissions",
        }
    }

    /// Look up a field by its storage key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

/// Namespaced view over a [`StorageBackend`].
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn StorageBackend>,
}

impl PersistentStore {
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Store `value` under `key`. A no-op when `key` is not a persisted field.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<(), StorageError> {
        match PersistedKey::from_key(key) {
            Some(field) => self.put(field, value),
            None => {
                debug!(key, "ignoring write to unrecognized storage key");
                Ok(())
            }
        }
    }

    /// Typed form of [`PersistentStore::set`].
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn put(&self, key: PersistedKey, value: impl Into<Value>) -> Result<(), StorageError> {
        let mut fields = self.load()?;
        fields.insert(key.as_str().to_owned(), value.into());
        self.backend.write(STORAGE_NAMESPACE, Value::Object(fields))
    }

    /// Read `key`, or an empty string when the key or namespace is absent.
    ///
    /// Backend failures are logged and read as absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Value {
        let fields = self.load().unwrap_or_else(|e| {
            warn!(error = %e, "session storage unreadable; treating as empty");
            Map::new()
        });
        match fields.get(key) {
            None | Some(Value::Null) => Value::String(String::new()),
            Some(value) => value.clone(),
        }
    }

    /// Read a scalar field as a string. Numbers are rendered in decimal.
    #[must_use]
    pub fn get_string(&self, key: PersistedKey) -> String {
        match self.get(key.as_str()) {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        }
    }

    /// Read a list field. Anything other than an array reads as empty.
    #[must_use]
    pub fn get_list(&self, key: PersistedKey) -> Vec<String> {
        match self.get(key.as_str()) {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Remove one key from the namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut fields = self.load()?;
        fields.remove(key);
        self.backend.write(STORAGE_NAMESPACE, Value::Object(fields))
    }

    /// Drop the whole namespace in one backend operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend delete fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.backend.delete(STORAGE_NAMESPACE)
    }

    fn load(&self) -> Result<Map<String, Value>, StorageError> {
        match self.backend.read(STORAGE_NAMESPACE)? {
            Some(Value::Object(fields)) => Ok(fields),
            _ => Ok(Map::new()),
        }
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
