//! Navigation interceptor.
//!
//! DESIGN
//! ======
//! `GuardPolicy::decide` is the single policy function. `NavigationGuard`
//! calls it from one explicit entry point per shell primitive, reading the
//! token fresh from the session on every attempt; nothing is cached.
//!
//! ERROR HANDLING
//! ==============
//! Host failures (performing a redirect or the navigation itself) are logged
//! through `fail` and swallowed. They never reach the caller and never touch
//! session state.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::NavigationError;
use super::intent::{AllowList, HOME_PAGE, NavigationIntent, NavigationPrimitive};
use crate::config::DEFAULT_LOGIN_PAGE;
use crate::session::SessionService;

/// Authentication state as seen by the interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Authenticated,
    Anonymous,
}

impl AuthState {
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        if token.is_empty() { Self::Anonymous } else { Self::Authenticated }
    }
}

/// Outcome of the policy for one intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Let the navigation through unchanged.
    Allow,
    /// Suppress the navigation and re-launch the shell at this url.
    Redirect(String),
}

impl Decision {
    #[must_use]
    pub fn proceeds(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Access policy: allow-list plus the login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPolicy {
    allow_list: AllowList,
    login_page: String,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self::new(AllowList::default(), DEFAULT_LOGIN_PAGE)
    }
}

impl GuardPolicy {
    /// The login page is always reachable while signed out, so it is added
    /// to `allow_list` if missing.
    pub fn new(mut allow_list: AllowList, login_page: impl Into<String>) -> Self {
        let login_page = login_page.into();
        allow_list.insert(login_page.clone());
        Self { allow_list, login_page }
    }

    #[must_use]
    pub fn login_page(&self) -> &str {
        &self.login_page
    }

    #[must_use]
    pub fn decide(&self, state: AuthState, intent: &NavigationIntent) -> Decision {
        let key = intent.match_key();
        match state {
            AuthState::Authenticated if key == self.login_page => Decision::Redirect(HOME_PAGE.to_owned()),
            AuthState::Authenticated => Decision::Allow,
            AuthState::Anonymous if self.allow_list.contains(key) => Decision::Allow,
            AuthState::Anonymous => Decision::Redirect(self.login_page.clone()),
        }
    }
}

/// The host shell's navigation primitives.
pub trait NavigationHost: Send + Sync {
    /// Carry out `primitive` towards `url`.
    fn perform(&self, primitive: NavigationPrimitive, url: &str) -> Result<(), NavigationError>;
}

/// Applies [`GuardPolicy`] in front of a [`NavigationHost`].
#[derive(Clone)]
pub struct NavigationGuard {
    session: SessionService,
    policy: Arc<GuardPolicy>,
    host: Arc<dyn NavigationHost>,
}

impl NavigationGuard {
    #[must_use]
    pub fn new(session: SessionService, policy: GuardPolicy, host: Arc<dyn NavigationHost>) -> Self {
        Self { session, policy: Arc::new(policy), host }
    }

    /// Interception hook: `true` lets the navigation proceed, `false` means
    /// it was suppressed (a redirect has been issued in its place).
    pub fn invoke(&self, primitive: NavigationPrimitive, intent: &NavigationIntent) -> bool {
        let state = AuthState::from_token(&self.session.token());
        match self.policy.decide(state, intent) {
            Decision::Allow => {
                debug!(%primitive, url = %intent, ?state, "navigation allowed");
                true
            }
            Decision::Redirect(target) => {
                info!(%primitive, url = %intent, redirect = %target, ?state, "navigation redirected");
                if let Err(e) = self.host.perform(NavigationPrimitive::ReLaunch, &target) {
                    self.fail(&e);
                }
                false
            }
        }
    }

    /// Failure hook: log and swallow.
    pub fn fail(&self, error: &NavigationError) {
        warn!(error = %error, "navigation hook failed");
    }

    /// Push a page.
    pub fn navigate_to(&self, url: &str) -> bool {
        self.dispatch(NavigationPrimitive::NavigateTo, url)
    }

    /// Replace the current page.
    pub fn redirect_to(&self, url: &str) -> bool {
        self.dispatch(NavigationPrimitive::RedirectTo, url)
    }

    /// Reset the stack to a single page.
    pub fn re_launch(&self, url: &str) -> bool {
        self.dispatch(NavigationPrimitive::ReLaunch, url)
    }

    /// Switch to a tab page.
    pub fn switch_tab(&self, url: &str) -> bool {
        self.dispatch(NavigationPrimitive::SwitchTab, url)
    }

    /// Run `primitive` through the policy and, if allowed, the host.
    ///
    /// Returns whether the requested navigation was carried out.
    pub fn dispatch(&self, primitive: NavigationPrimitive, url: &str) -> bool {
        let intent = NavigationIntent::parse(url);
        if !self.invoke(primitive, &intent) {
            return false;
        }
        match self.host.perform(primitive, url) {
            Ok(()) => true,
            Err(e) => {
                self.fail(&e);
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
