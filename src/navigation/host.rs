//! In-process page stack implementing the shell's navigation primitives.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::NavigationError;
use super::guard::NavigationHost;
use super::intent::NavigationPrimitive;

/// Maximum pages a shell keeps open before `navigateTo` is refused.
pub const MAX_STACK_DEPTH: usize = 10;

/// Page stack with shell semantics.
///
/// `navigateTo` pushes, `redirectTo` replaces the top page, `reLaunch` and
/// `switchTab` clear the stack before opening the target.
#[derive(Debug, Default)]
pub struct PageStack {
    pages: Mutex<Vec<String>>,
}

impl PageStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `url` already open.
    #[must_use]
    pub fn with_root(url: &str) -> Self {
        Self { pages: Mutex::new(vec![url.to_owned()]) }
    }

    /// Open pages, bottom first.
    #[must_use]
    pub fn pages(&self) -> Vec<String> {
        self.lock().clone()
    }

    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NavigationHost for PageStack {
    fn perform(&self, primitive: NavigationPrimitive, url: &str) -> Result<(), NavigationError> {
        if url.is_empty() {
            return Err(NavigationError::Host(format!("{primitive}: missing url")));
        }
        let mut pages = self.lock();
        match primitive {
            NavigationPrimitive::NavigateTo => {
                if pages.len() >= MAX_STACK_DEPTH {
                    return Err(NavigationError::Host(format!(
                        "{primitive}: page stack limit of {MAX_STACK_DEPTH} reached"
                    )));
                }
                pages.push(url.to_owned());
            }
            NavigationPrimitive::RedirectTo => {
                pages.pop();
                pages.push(url.to_owned());
            }
            NavigationPrimitive::ReLaunch | NavigationPrimitive::SwitchTab => {
                pages.clear();
                pages.push(url.to_owned());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "host_test.rs"]
mod tests;
