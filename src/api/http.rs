//! HTTP client for the admin backend's login endpoints.
//!
//! Thin reqwest wrapper over `/login`, `/getInfo` and `/logout`. Every
//! response is a JSON envelope `{code, msg, ...}` returned with HTTP 200;
//! the business `code` decides success. Envelope handling lives in pure
//! functions for testability.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{LoginRequest, LoginResponse, ProfileResult, RemoteApi, RemoteError};
use crate::config::HttpTimeouts;
use crate::storage::CredentialStore;

const CODE_SUCCESS: i64 = 200;
const CODE_UNAUTHORIZED: i64 = 401;

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpRemoteApi {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpRemoteApi {
    /// Build a client rooted at `base_url`.
    ///
    /// `credentials` supplies the bearer token for authenticated calls, read
    /// fresh on every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        timeouts: HttpTimeouts,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| RemoteError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned(), credentials })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, RemoteError> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(RemoteError::Status { status, body: text });
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, RemoteError> {
        debug!(username = %request.username, "POST /login");
        let text = self.send(self.http.post(self.url("/login")).form(request)).await?;
        parse_envelope(&text)
    }

    async fn get_profile(&self) -> Result<ProfileResult, RemoteError> {
        debug!("GET /getInfo");
        let mut request = self.http.get(self.url("/getInfo"));
        let token = self.credentials.get_token();
        if !token.is_empty() {
            request = request.bearer_auth(token);
        }
        let text = self.send(request).await?;
        parse_envelope(&text)
    }

    async fn logout(&self, token: &str) -> Result<(), RemoteError> {
        debug!("POST /logout");
        let text = self
            .send(self.http.post(self.url("/logout")).bearer_auth(token))
            .await?;
        check_envelope(&text)
    }
}

// =============================================================================
// ENVELOPE
// =============================================================================

#[derive(serde::Deserialize)]
struct EnvelopeHead {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
}

/// Validate the envelope's business code without decoding a payload.
pub(crate) fn check_envelope(json: &str) -> Result<(), RemoteError> {
    let head: EnvelopeHead = serde_json::from_str(json).map_err(|e| RemoteError::Parse(e.to_string()))?;
    let msg = head.msg.unwrap_or_default();
    match head.code {
        CODE_SUCCESS => Ok(()),
        CODE_UNAUTHORIZED => Err(RemoteError::Unauthorized { msg }),
        code => Err(RemoteError::Server { code, msg }),
    }
}

/// Validate the envelope, then decode its payload fields into `T`.
pub(crate) fn parse_envelope<T: DeserializeOwned>(json: &str) -> Result<T, RemoteError> {
    check_envelope(json)?;
    serde_json::from_str(json).map_err(|e| RemoteError::Parse(e.to_string()))
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
