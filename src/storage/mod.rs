//! Durable storage for session state.
//!
//! DESIGN
//! ======
//! Three layers, leaves first:
//! - `backend`: a flat, synchronous map of top-level keys to JSON values
//!   (in-memory or a single JSON file on disk).
//! - `store`: the namespaced `PersistentStore` holding the five persisted
//!   session fields under one backend key.
//! - `credential`: the bearer-token store, kept outside the namespace so it
//!   can be backed by a differently scoped mechanism.

pub mod backend;
pub mod credential;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use credential::{CredentialStore, StorageTokenStore, TOKEN_KEY};
pub use store::{PersistedKey, PersistentStore, STORAGE_NAMESPACE};

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document could not be encoded or decoded.
    #[error("storage document malformed: {0}")]
    Serialize(#[from] serde_json::Error),
}
