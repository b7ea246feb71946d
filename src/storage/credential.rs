//! Bearer-token storage.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use super::{StorageBackend, StorageError};

/// Backend key for the bearer token. Lives outside the session namespace.
pub const TOKEN_KEY: &str = "App-Token";

/// Holds the bearer credential for the current session.
pub trait CredentialStore: Send + Sync {
    /// Current token, or an empty string when none is stored.
    fn get_token(&self) -> String;

    /// Replace the stored token.
    fn set_token(&self, token: &str) -> Result<(), StorageError>;

    /// Forget the stored token.
    fn remove_token(&self) -> Result<(), StorageError>;
}

/// [`CredentialStore`] writing the token under [`TOKEN_KEY`] of a backend.
#[derive(Clone)]
pub struct StorageTokenStore {
    backend: Arc<dyn StorageBackend>,
}

impl StorageTokenStore {
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }
}

impl CredentialStore for StorageTokenStore {
    fn get_token(&self) -> String {
        match self.backend.read(TOKEN_KEY) {
            Ok(Some(Value::String(token))) => token,
            Ok(_) => String::new(),
            Err(e) => {
                warn!(error = %e, "credential storage unreadable; treating as signed out");
                String::new()
            }
        }
    }

    fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.backend.write(TOKEN_KEY, Value::String(token.to_owned()))
    }

    fn remove_token(&self) -> Result<(), StorageError> {
        self.backend.delete(TOKEN_KEY)
    }
}

#[cfg(test)]
#[path = "credential_test.rs"]
mod tests;
