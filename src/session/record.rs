//! The authoritative session snapshot.

use serde::Serialize;

/// Sentinel role recorded when the server reports no roles for a user.
pub const DEFAULT_ROLE: &str = "ROLE_DEFAULT";

/// Current user's token, identity and permission set.
///
/// An empty `token` means signed out.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    #[serde(skip)]
    pub token: String,
    pub user_id: String,
    pub user_name: String,
    pub avatar_url: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl SessionRecord {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }
}

impl std::fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = if self.token.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("SessionRecord")
            .field("token", &token)
            .field("user_id", &self.user_id)
            .field("user_name", &self.user_name)
            .field("avatar_url", &self.avatar_url)
            .field("roles", &self.roles)
            .field("permissions", &self.permissions)
            .finish()
    }
}
