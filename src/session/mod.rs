//! Session state container.
//!
//! DESIGN
//! ======
//! One owned `SessionRecord` per process, reached only through an explicitly
//! passed `SessionService` handle. Identity and permission fields are
//! mirrored into the `PersistentStore` on every mutation; the token goes to
//! the `CredentialStore`.

pub mod permission;
pub mod record;
pub mod service;

pub use record::{DEFAULT_ROLE, SessionRecord};
pub use service::{AvatarSettings, SessionError, SessionService, resolve_avatar};
