//! Runtime configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:9099";
pub const DEFAULT_STORAGE_PATH: &str = ".session/storage.json";
pub const DEFAULT_AVATAR: &str = "/static/images/profile.jpg";
pub const DEFAULT_LOGIN_PAGE: &str = "/pages/login";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Remote API root; also prefixes relative avatar paths.
    pub base_url: String,
    /// JSON document backing the persisted session and token.
    pub storage_path: PathBuf,
    /// Local asset used when the profile has no avatar.
    pub default_avatar: String,
    /// Page anonymous navigations are redirected to.
    pub login_page: String,
    pub timeouts: HttpTimeouts,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            default_avatar: DEFAULT_AVATAR.to_owned(),
            login_page: DEFAULT_LOGIN_PAGE.to_owned(),
            timeouts: HttpTimeouts::default(),
        }
    }
}

impl AppConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// - `SESSION_BASE_URL`: default `http://localhost:9099` (trailing `/` trimmed)
    /// - `SESSION_STORAGE_PATH`: default `.session/storage.json`
    /// - `SESSION_DEFAULT_AVATAR`: default `/static/images/profile.jpg`
    /// - `SESSION_LOGIN_PAGE`: default `/pages/login`
    /// - `SESSION_REQUEST_TIMEOUT_SECS`: default 10
    /// - `SESSION_CONNECT_TIMEOUT_SECS`: default 5
    ///
    /// # Errors
    ///
    /// Returns an error if a timeout variable is set but not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("SESSION_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let storage_path = std::env::var("SESSION_STORAGE_PATH")
            .map_or_else(|_| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from);
        let default_avatar = std::env::var("SESSION_DEFAULT_AVATAR").unwrap_or_else(|_| DEFAULT_AVATAR.to_owned());
        let login_page = std::env::var("SESSION_LOGIN_PAGE").unwrap_or_else(|_| DEFAULT_LOGIN_PAGE.to_owned());
        let timeouts = HttpTimeouts {
            request_secs: env_parse_secs("SESSION_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse_secs("SESSION_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { base_url, storage_path, default_avatar, login_page, timeouts })
    }
}

fn env_parse_secs(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidValue { key, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
