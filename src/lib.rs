//! # session-guard
//!
//! Client-side session state and navigation guard for a multi-page
//! application shell.
//!
//! - [`storage`]: the namespaced persistent store and the token store.
//! - [`session`]: the session record and its login / profile / logout
//!   lifecycle, plus permission and role checks.
//! - [`navigation`]: the interceptor gating every page change on the
//!   current token.
//! - [`api`]: the remote authentication API the session talks to.

pub mod api;
pub mod config;
pub mod navigation;
pub mod session;
pub mod storage;

pub use api::{HttpRemoteApi, RemoteApi, RemoteError};
pub use config::AppConfig;
pub use navigation::{GuardPolicy, NavigationGuard, NavigationHost, NavigationIntent, NavigationPrimitive, PageStack};
pub use session::{SessionError, SessionRecord, SessionService};
pub use storage::{CredentialStore, FileBackend, MemoryBackend, PersistentStore, StorageBackend, StorageTokenStore};
