//! Permission and role checks against the current session.
//!
//! `*:*:*` grants every permission and the `admin` role satisfies every role
//! check. An empty query never matches.

use super::record::SessionRecord;
use super::service::SessionService;

/// Permission string granting everything.
pub const ALL_PERMISSION: &str = "*:*:*";

/// Role satisfying every role check.
pub const SUPER_ADMIN_ROLE: &str = "admin";

fn grants(held: &[String], wildcard: &str, wanted: &str) -> bool {
    !wanted.is_empty() && held.iter().any(|h| h == wildcard || h == wanted)
}

impl SessionRecord {
    #[must_use]
    pub fn has_permi(&self, permission: &str) -> bool {
        grants(&self.permissions, ALL_PERMISSION, permission)
    }

    /// True when any of `permissions` is granted.
    #[must_use]
    pub fn has_permi_or<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions.iter().any(|p| self.has_permi(p.as_ref()))
    }

    /// True when every one of `permissions` is granted. Empty input is false.
    #[must_use]
    pub fn has_permi_and<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        !permissions.is_empty() && permissions.iter().all(|p| self.has_permi(p.as_ref()))
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        grants(&self.roles, SUPER_ADMIN_ROLE, role)
    }

    #[must_use]
    pub fn has_role_or<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|r| self.has_role(r.as_ref()))
    }

    #[must_use]
    pub fn has_role_and<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        !roles.is_empty() && roles.iter().all(|r| self.has_role(r.as_ref()))
    }
}

impl SessionService {
    #[must_use]
    pub fn has_permi(&self, permission: &str) -> bool {
        self.snapshot().has_permi(permission)
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.snapshot().has_role(role)
    }
}

#[cfg(test)]
#[path = "permission_test.rs"]
mod tests;
