use std::collections::HashMap;
use std::sync::Mutex;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::json;

use super::*;
use crate::storage::{MemoryBackend, StorageTokenStore};

// =============================================================================
// Helpers
// =============================================================================

async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: &str) -> (HttpRemoteApi, Arc<StorageTokenStore>) {
    let tokens = Arc::new(StorageTokenStore::new(Arc::new(MemoryBackend::new())));
    let api = HttpRemoteApi::new(base_url, HttpTimeouts::default(), tokens.clone()).unwrap();
    (api, tokens)
}

fn bearer(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

fn login_request(username: &str) -> LoginRequest {
    LoginRequest { username: username.into(), password: "pw".into(), code: "123".into(), uuid: "u1".into() }
}

// =============================================================================
// Envelope parsing
// =============================================================================

#[test]
fn check_envelope_success() {
    assert!(check_envelope(r#"{"code":200,"msg":"ok"}"#).is_ok());
}

#[test]
fn check_envelope_unauthorized() {
    let err = check_envelope(r#"{"code":401,"msg":"expired"}"#).unwrap_err();
    assert!(matches!(err, RemoteError::Unauthorized { msg } if msg == "expired"));
}

#[test]
fn check_envelope_business_error() {
    let err = check_envelope(r#"{"code":601,"msg":"captcha wrong"}"#).unwrap_err();
    assert!(matches!(err, RemoteError::Server { code: 601, msg } if msg == "captcha wrong"));
}

#[test]
fn check_envelope_missing_code_is_parse_error() {
    let err = check_envelope(r#"{"msg":"??"}"#).unwrap_err();
    assert!(matches!(err, RemoteError::Parse(_)));
}

#[test]
fn parse_envelope_failure_code_wins_over_missing_payload() {
    let err = parse_envelope::<LoginResponse>(r#"{"code":500,"msg":"boom"}"#).unwrap_err();
    assert!(matches!(err, RemoteError::Server { code: 500, .. }));
}

#[test]
fn parse_envelope_decodes_payload() {
    let resp: LoginResponse = parse_envelope(r#"{"code":200,"msg":"ok","token":"t"}"#).unwrap();
    assert_eq!(resp.token, "t");
}

#[test]
fn new_trims_trailing_slash() {
    let (api, _) = client("http://localhost:9099/");
    assert_eq!(api.base_url(), "http://localhost:9099");
}

// =============================================================================
// Live round trips against a fake backend
// =============================================================================

#[tokio::test]
async fn login_posts_form_fields() {
    let seen: Arc<Mutex<Vec<HashMap<String, String>>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let router = Router::new().route(
        "/login",
        post(move |Form(form): Form<HashMap<String, String>>| {
            let recorder = recorder.clone();
            async move {
                recorder.lock().unwrap().push(form);
                Json(json!({"code": 200, "msg": "ok", "token": "tok1"}))
            }
        }),
    );
    let base = spawn_backend(router).await;
    let (api, _) = client(&base);

    let resp = api.login(&login_request("bob")).await.unwrap();
    assert_eq!(resp.token, "tok1");

    let forms = seen.lock().unwrap();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0]["username"], "bob");
    assert_eq!(forms[0]["password"], "pw");
    assert_eq!(forms[0]["code"], "123");
    assert_eq!(forms[0]["uuid"], "u1");
}

#[tokio::test]
async fn login_business_failure_surfaces_server_error() {
    let router = Router::new().route(
        "/login",
        post(|| async { Json(json!({"code": 601, "msg": "bad captcha"})) }),
    );
    let base = spawn_backend(router).await;
    let (api, _) = client(&base);

    let err = api.login(&login_request("bob")).await.unwrap_err();
    assert!(matches!(err, RemoteError::Server { code: 601, .. }));
}

#[tokio::test]
async fn get_profile_sends_stored_token() {
    let router = Router::new().route(
        "/getInfo",
        get(|headers: HeaderMap| async move {
            if bearer(&headers) != "Bearer tok1" {
                return Json(json!({"code": 401, "msg": "no token"}));
            }
            Json(json!({
                "code": 200,
                "msg": "ok",
                "user": {"userId": 1, "userName": "admin", "avatar": ""},
                "roles": ["admin"],
                "permissions": ["*:*:*"]
            }))
        }),
    );
    let base = spawn_backend(router).await;
    let (api, tokens) = client(&base);

    let err = api.get_profile().await.unwrap_err();
    assert!(matches!(err, RemoteError::Unauthorized { .. }));

    tokens.set_token("tok1").unwrap();
    let profile = api.get_profile().await.unwrap();
    assert_eq!(profile.roles, vec!["admin"]);
    assert_eq!(profile.user.unwrap().user_id.as_deref(), Some("1"));
}

#[tokio::test]
async fn logout_sends_given_token() {
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let router = Router::new().route(
        "/logout",
        post(move |headers: HeaderMap| {
            let recorder = recorder.clone();
            async move {
                recorder.lock().unwrap().push(bearer(&headers));
                Json(json!({"code": 200, "msg": "bye"}))
            }
        }),
    );
    let base = spawn_backend(router).await;
    let (api, _) = client(&base);

    api.logout("tok9").await.unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["Bearer tok9".to_owned()]);
}

#[tokio::test]
async fn non_success_status_is_status_error() {
    let router = Router::new().route(
        "/logout",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let base = spawn_backend(router).await;
    let (api, _) = client(&base);

    let err = api.logout("t").await.unwrap_err();
    assert!(matches!(err, RemoteError::Status { status: 502, body } if body == "upstream down"));
}

#[tokio::test]
async fn unreachable_backend_is_request_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let (api, _) = client(&format!("http://{addr}"));

    let err = api.get_profile().await.unwrap_err();
    assert!(matches!(err, RemoteError::Request(_)));
}

#[tokio::test]
async fn malformed_body_is_parse_error() {
    let router = Router::new().route("/getInfo", get(|| async { "<html>oops</html>" }));
    let base = spawn_backend(router).await;
    let (api, _) = client(&base);

    let err = api.get_profile().await.unwrap_err();
    assert!(matches!(err, RemoteError::Parse(_)));
}

