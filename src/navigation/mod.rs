//! Navigation interceptor and the pieces it is built from.
//!
//! DESIGN
//! ======
//! - `intent`: destinations, shell primitives and the anonymous allow-list.
//! - `guard`: the access policy and the interceptor applying it.
//! - `host`: an in-process page stack standing in for the shell.

pub mod guard;
pub mod host;
pub mod intent;

pub use guard::{AuthState, Decision, GuardPolicy, NavigationGuard, NavigationHost};
pub use host::{MAX_STACK_DEPTH, PageStack};
pub use intent::{AllowList, DEFAULT_ALLOW_LIST, HOME_PAGE, NavigationIntent, NavigationPrimitive};

/// Errors from the host shell's navigation hook. Logged, never propagated
/// out of the interceptor.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("navigation host failed: {0}")]
    Host(String),

    #[error("unknown navigation primitive: {0}")]
    UnknownPrimitive(String),
}
