//! Remote API contract: request/response types, errors and the client trait.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// ERROR
// =============================================================================

/// Network or server failures reported by the remote API.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("API request failed: {0}")]
    Request(String),

    /// The server answered with a non-success HTTP status.
    #[error("API response error: status {status}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("API response parse failed: {0}")]
    Parse(String),

    /// The envelope reported an authentication failure.
    #[error("unauthorized: {msg}")]
    Unauthorized { msg: String },

    /// The envelope carried a non-success business code.
    #[error("server error {code}: {msg}")]
    Server { code: i64, msg: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// LOGIN
// =============================================================================

/// Credentials submitted to the login endpoint.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Captcha answer. Empty when the server has captcha disabled.
    pub code: String,
    /// Captcha challenge id paired with `code`.
    pub uuid: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("code", &self.code)
            .field("uuid", &self.uuid)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse").field("token", &"<redacted>").finish()
    }
}

// =============================================================================
// PROFILE
// =============================================================================

/// The `user` object of a profile response.
///
/// Only the identity fields are typed; everything else the server sends is
/// kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Full profile response, returned unchanged to callers of `fetch_profile`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileResult {
    #[serde(default)]
    pub user: Option<ProfileUser>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub permissions: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!("expected string or number, got {other}"))),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// CLIENT TRAIT
// =============================================================================

/// Remote authentication API consumed by the session service.
///
/// Implementations own transport concerns (timeouts, retries, auth headers).
/// Errors are surfaced to session callers unchanged.
#[async_trait::async_trait]
pub trait RemoteApi: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, RemoteError>;

    /// Fetch the signed-in user's identity, roles and permissions.
    async fn get_profile(&self) -> Result<ProfileResult, RemoteError>;

    /// Invalidate `token` on the server.
    async fn logout(&self, token: &str) -> Result<(), RemoteError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
