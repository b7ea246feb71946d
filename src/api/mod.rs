//! Remote authentication API.
//!
//! DESIGN
//! ======
//! The session service depends only on the `RemoteApi` trait. `HttpRemoteApi`
//! is the production implementation; tests substitute in-process mocks.

pub mod http;
pub mod types;

pub use http::HttpRemoteApi;
pub use types::{LoginRequest, LoginResponse, ProfileResult, ProfileUser, RemoteApi, RemoteError};
