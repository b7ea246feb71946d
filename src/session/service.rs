//! Session lifecycle: hydrate, login, fetch profile, logout.
//!
//! DESIGN
//! ======
//! `SessionService` is a cheap cloneable handle over one shared record. The
//! record sits behind a `std::sync::RwLock` that is only ever held for a
//! field assignment, never across an `.await`, so lifecycle operations
//! suspend only at the remote-call boundary.
//!
//! ERROR HANDLING
//! ==============
//! Nothing is mutated until the remote call has succeeded. Each persisted
//! field is written to storage first and to memory second, so a storage
//! failure part way through leaves every field either fully updated or
//! untouched. No retries happen here.
//!
//! TRADE-OFFS
//! ==========
//! Lifecycle operations are not serialized against each other. Two
//! overlapping calls (e.g. `login` racing `logout`) apply their mutations in
//! completion order.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use tracing::{info, warn};

use super::record::{DEFAULT_ROLE, SessionRecord};
use crate::api::{LoginRequest, ProfileResult, RemoteApi, RemoteError};
use crate::config::AppConfig;
use crate::storage::{CredentialStore, PersistedKey, PersistentStore, StorageError};

/// Errors returned by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// How relative avatar paths from the server are qualified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarSettings {
    pub base_url: String,
    pub default_avatar: String,
}

impl From<&AppConfig> for AvatarSettings {
    fn from(config: &AppConfig) -> Self {
        Self { base_url: config.base_url.clone(), default_avatar: config.default_avatar.clone() }
    }
}

/// Resolve the avatar path reported by the server into a displayable URL.
///
/// Absolute `http(s)` URLs pass through, an empty path falls back to the
/// default asset, anything else is prefixed with the base URL.
#[must_use]
pub fn resolve_avatar(raw: &str, settings: &AvatarSettings) -> String {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_owned()
    } else if raw.is_empty() {
        settings.default_avatar.clone()
    } else {
        format!("{}{raw}", settings.base_url)
    }
}

// =============================================================================
// FIELD UPDATES
// =============================================================================

/// One persisted field paired with its new value.
enum FieldUpdate {
    UserId(String),
    UserName(String),
    Avatar(String),
    Roles(Vec<String>),
    Permissions(Vec<String>),
}

impl FieldUpdate {
    fn key(&self) -> PersistedKey {
        match self {
            Self::UserId(_) => PersistedKey::UserId,
            Self::UserName(_) => PersistedKey::UserName,
            Self::Avatar(_) => PersistedKey::Avatar,
            Self::Roles(_) => PersistedKey::Roles,
            Self::Permissions(_) => PersistedKey::Permissions,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::UserId(s) | Self::UserName(s) | Self::Avatar(s) => Value::String(s.clone()),
            Self::Roles(list) | Self::Permissions(list) => {
                Value::Array(list.iter().cloned().map(Value::String).collect())
            }
        }
    }

    fn apply(self, record: &mut SessionRecord) {
        match self {
            Self::UserId(s) => record.user_id = s,
            Self::UserName(s) => record.user_name = s,
            Self::Avatar(s) => record.avatar_url = s,
            Self::Roles(list) => record.roles = list,
            Self::Permissions(list) => record.permissions = list,
        }
    }
}

// =============================================================================
// SERVICE
// =============================================================================

/// Handle to the shared session state. Clones refer to the same session.
#[derive(Clone)]
pub struct SessionService {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    record: RwLock<SessionRecord>,
    api: Arc<dyn RemoteApi>,
    credentials: Arc<dyn CredentialStore>,
    store: PersistentStore,
    avatar: AvatarSettings,
}

impl SessionService {
    /// Hydrate a session from storage. Performs no network I/O.
    #[must_use]
    pub fn initialize(
        api: Arc<dyn RemoteApi>,
        credentials: Arc<dyn CredentialStore>,
        store: PersistentStore,
        avatar: AvatarSettings,
    ) -> Self {
        let record = SessionRecord {
            token: credentials.get_token(),
            user_id: store.get_string(PersistedKey::UserId),
            user_name: store.get_string(PersistedKey::UserName),
            avatar_url: store.get_string(PersistedKey::Avatar),
            roles: store.get_list(PersistedKey::Roles),
            permissions: store.get_list(PersistedKey::Permissions),
        };
        info!(
            authenticated = record.is_authenticated(),
            user = %record.user_name,
            "session hydrated from storage"
        );
        Self {
            inner: Arc::new(SessionInner { record: RwLock::new(record), api, credentials, store, avatar }),
        }
    }

    /// Copy of the current record.
    #[must_use]
    pub fn snapshot(&self) -> SessionRecord {
        self.read().clone()
    }

    /// Current bearer token; empty when signed out.
    #[must_use]
    pub fn token(&self) -> String {
        self.read().token.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    /// Sign in and store the returned token.
    ///
    /// The username is trimmed before it is sent.
    ///
    /// # Errors
    ///
    /// Returns the remote error unchanged, or a storage error if the token
    /// cannot be saved. The record is untouched on error.
    pub async fn login(&self, username: &str, password: &str, code: &str, uuid: &str) -> Result<(), SessionError> {
        let request = LoginRequest {
            username: username.trim().to_owned(),
            password: password.to_owned(),
            code: code.to_owned(),
            uuid: uuid.to_owned(),
        };
        let response = self.inner.api.login(&request).await?;

        self.inner.credentials.set_token(&response.token)?;
        self.write().token = response.token;
        info!(user = %request.username, "login succeeded");
        Ok(())
    }

    /// Fetch the profile and write identity, avatar, roles and permissions
    /// through to storage. Returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns the remote error unchanged (nothing is written), or a storage
    /// error for the first field that failed to persist.
    pub async fn fetch_profile(&self) -> Result<ProfileResult, SessionError> {
        let profile = self.inner.api.get_profile().await?;

        let user = profile.user.as_ref();
        let user_id = user.and_then(|u| u.user_id.clone()).unwrap_or_default();
        let user_name = user.and_then(|u| u.user_name.clone()).unwrap_or_default();
        let raw_avatar = user.and_then(|u| u.avatar.as_deref()).unwrap_or("");
        let avatar_url = resolve_avatar(raw_avatar, &self.inner.avatar);

        let (roles, permissions) = if profile.roles.is_empty() {
            (vec![DEFAULT_ROLE.to_owned()], self.read().permissions.clone())
        } else {
            (profile.roles.clone(), profile.permissions.clone())
        };

        for update in [
            FieldUpdate::UserId(user_id),
            FieldUpdate::UserName(user_name),
            FieldUpdate::Avatar(avatar_url),
            FieldUpdate::Roles(roles),
            FieldUpdate::Permissions(permissions),
        ] {
            self.commit(update)?;
        }

        let record = self.read();
        info!(
            user = %record.user_name,
            roles = record.roles.len(),
            permissions = record.permissions.len(),
            "profile loaded"
        );
        Ok(profile)
    }

    /// Sign out on the server, then forget the token and every persisted field.
    ///
    /// The whole in-memory record is reset, identity fields (`user_id`,
    /// `user_name`, `avatar_url`) included, not just token, roles and
    /// permissions.
    ///
    /// # Errors
    ///
    /// Returns the remote error unchanged with no mutation. Once the server
    /// has accepted the logout the in-memory session is always cleared and
    /// both storage removals are attempted; the first storage error is
    /// returned afterwards.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let token = self.token();
        self.inner.api.logout(&token).await?;

        *self.write() = SessionRecord::default();
        let token_result = self.inner.credentials.remove_token();
        let store_result = self.inner.store.clear();
        for (what, result) in [("token", &token_result), ("session fields", &store_result)] {
            if let Err(e) = result {
                warn!(error = %e, "failed to remove stored {what} on logout");
            }
        }
        token_result?;
        store_result?;
        info!("logout succeeded");
        Ok(())
    }

    /// Replace the avatar locally. No network call.
    ///
    /// # Errors
    ///
    /// Returns an error if the avatar cannot be persisted.
    pub fn set_avatar(&self, url: &str) -> Result<(), SessionError> {
        self.commit(FieldUpdate::Avatar(url.to_owned()))
    }

    fn commit(&self, update: FieldUpdate) -> Result<(), SessionError> {
        let key = update.key();
        if let Err(e) = self.inner.store.put(key, update.to_value()) {
            warn!(field = key.as_str(), error = %e, "failed to persist session field");
            return Err(e.into());
        }
        update.apply(&mut self.write());
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionRecord> {
        self.inner.record.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionRecord> {
        self.inner.record.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
