#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chalkdesk::directory::UserDirectory;
use chalkdesk::sessions::DuplicatePolicy;
use chalkdesk::tokens::{RtcConfig, WhiteboardConfig};
use chalkdesk::{ServerConfig, create_app};
use std::sync::{Arc, OnceLock};
use tower::ServiceExt;

/// Seeded directory shared across tests. Building it hashes the seed
/// passwords with bcrypt, so pay that cost once per test binary.
static DIRECTORY: OnceLock<Arc<UserDirectory>> = OnceLock::new();

pub fn seeded_directory() -> Arc<UserDirectory> {
    DIRECTORY
        .get_or_init(|| Arc::new(UserDirectory::seeded()))
        .clone()
}

fn test_upload_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("chalkdesk-tests-{}", std::process::id()))
}

/// Baseline test configuration: no third-party credentials configured.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        directory: seeded_directory(),
        jwt_secret: b"test-jwt-secret-at-least-32-chars!!".to_vec(),
        access_token_ttl: "24h".to_string(),
        refresh_token_ttl: "7d".to_string(),
        rtc: RtcConfig::default(),
        whiteboard: WhiteboardConfig::default(),
        convert_api_base: "https://api.netless.link/v5".to_string(),
        upload_dir: test_upload_dir(),
        public_url: "http://localhost:5000".to_string(),
        cors_origin: None,
        session_duplicate_policy: DuplicatePolicy::Overwrite,
    }
}

pub fn create_test_app() -> Router {
    create_app(&test_config())
}

/// Send a JSON request and return status plus parsed body.
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

/// Log in and return the full response body.
pub async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, serde_json::Value) {
    send_json(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await
}

/// Log in and return the access token, panicking on failure.
pub async fn access_token(app: &Router, email: &str) -> String {
    let (status, body) = login(app, email, "password").await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["tokens"]["accessToken"]
        .as_str()
        .expect("missing access token")
        .to_string()
}
