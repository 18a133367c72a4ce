mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{create_test_app, send_json};
use tower::ServiceExt;

#[tokio::test]
async fn test_root_health() {
    let app = create_test_app();

    let (status, body) = send_json(&app, "GET", "/", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_test_app();

    let (status, _) = send_json(&app, "GET", "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_errors_are_json() {
    let app = create_test_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/validate")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["error"].as_str().is_some());
}
