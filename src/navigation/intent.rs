//! Navigation intents, primitives and the anonymous allow-list.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::NavigationError;

/// Application root, the redirect target for signed-in visits to the login page.
pub const HOME_PAGE: &str = "/";

/// Pages reachable without a token.
pub const DEFAULT_ALLOW_LIST: [&str; 5] = [
    "/pages/login",
    "/pages/register",
    "/pages/common/webview/index",
    "/pages/common/agreement/index",
    "/pages/common/privacy/index",
];

/// Shell operations that change the visible page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationPrimitive {
    /// Push a page onto the stack.
    NavigateTo,
    /// Replace the top page.
    RedirectTo,
    /// Drop the whole stack and open a page.
    ReLaunch,
    /// Switch to a tab page, dropping the non-tab stack.
    SwitchTab,
}

impl NavigationPrimitive {
    pub const ALL: [Self; 4] = [Self::NavigateTo, Self::RedirectTo, Self::ReLaunch, Self::SwitchTab];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NavigateTo => "navigateTo",
            Self::RedirectTo => "redirectTo",
            Self::ReLaunch => "reLaunch",
            Self::SwitchTab => "switchTab",
        }
    }
}

impl fmt::Display for NavigationPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NavigationPrimitive {
    type Err = NavigationError;

    /// Accepts the camelCase shell name or its kebab-case form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "navigateTo" | "navigate-to" => Ok(Self::NavigateTo),
            "redirectTo" | "redirect-to" => Ok(Self::RedirectTo),
            "reLaunch" | "re-launch" => Ok(Self::ReLaunch),
            "switchTab" | "switch-tab" => Ok(Self::SwitchTab),
            other => Err(NavigationError::UnknownPrimitive(other.to_owned())),
        }
    }
}

/// A requested destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    pub path: String,
    pub query: Option<String>,
}

impl NavigationIntent {
    /// Split a shell url at the first `?`.
    #[must_use]
    pub fn parse(url: &str) -> Self {
        match url.split_once('?') {
            Some((path, query)) => Self { path: path.to_owned(), query: Some(query.to_owned()) },
            None => Self { path: url.to_owned(), query: None },
        }
    }

    /// The path with any query stripped; the key used for policy matching.
    #[must_use]
    pub fn match_key(&self) -> &str {
        self.path.split_once('?').map_or(self.path.as_str(), |(path, _)| path)
    }

    /// Reassemble the url as the shell received it.
    #[must_use]
    pub fn url(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{query}", self.path),
            None => self.path.clone(),
        }
    }
}

impl fmt::Display for NavigationIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Exact-match set of paths reachable while signed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    paths: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { paths: paths.into_iter().map(Into::into).collect() }
    }

    /// Add a path to the list.
    pub fn insert(&mut self, path: impl Into<String>) {
        self.paths.insert(path.into());
    }

    /// Exact string membership. No prefix or pattern matching.
    #[must_use]
    pub fn contains(&self, match_key: &str) -> bool {
        self.paths.contains(match_key)
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOW_LIST)
    }
}

#[cfg(test)]
#[path = "intent_test.rs"]
mod tests;
