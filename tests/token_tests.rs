mod common;

use axum::http::StatusCode;
use chalkdesk::create_app;
use chalkdesk::tokens::{RtcConfig, WhiteboardConfig};
use common::{access_token, create_test_app, send_json, test_config};
use serde_json::json;

fn rtc_app(certificate: Option<&str>) -> axum::Router {
    let mut config = test_config();
    config.rtc = RtcConfig {
        app_id: Some("test-rtc-app".to_string()),
        certificate: certificate.map(str::to_string),
    };
    create_app(&config)
}

fn whiteboard_app() -> axum::Router {
    let mut config = test_config();
    config.whiteboard = WhiteboardConfig {
        app_id: Some("test-wb-app".to_string()),
        secret: Some("test-wb-secret".to_string()),
    };
    create_app(&config)
}

#[tokio::test]
async fn test_rtc_token_requires_auth() {
    let app = rtc_app(None);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/tokens/rtc",
        None,
        Some(json!({ "channelName": "channel_s1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rtc_token_unconfigured() {
    let app = create_test_app();
    let token = access_token(&app, "tutor@example.com").await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/tokens/rtc",
        Some(&token),
        Some(json!({ "channelName": "channel_s1" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_rtc_token_missing_channel() {
    let app = rtc_app(None);
    let token = access_token(&app, "tutor@example.com").await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/tokens/rtc",
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rtc_token_dev_mode_without_certificate() {
    let app = rtc_app(None);
    let token = access_token(&app, "tutor@example.com").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/tokens/rtc",
        Some(&token),
        Some(json!({ "channelName": "channel_s1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    // No certificate: explicit unsigned dev mode
    assert!(body["token"].is_null());
    assert!(body["uid"].as_u64().is_some());
    assert_eq!(body["channelName"], "channel_s1");
    assert!(body["expiresAt"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_rtc_token_signed_with_certificate() {
    let app = rtc_app(Some("test-certificate"));
    let token = access_token(&app, "tutor@example.com").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/tokens/rtc",
        Some(&token),
        Some(json!({ "channelName": "channel_s1", "role": "subscriber", "uid": 42 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["uid"], 42);
}

#[tokio::test]
async fn test_whiteboard_token_unconfigured() {
    let app = create_test_app();
    let token = access_token(&app, "tutor@example.com").await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/tokens/whiteboard",
        Some(&token),
        Some(json!({ "roomId": "room_s1" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_whiteboard_token_issued_for_authenticated_user() {
    let app = whiteboard_app();
    let token = access_token(&app, "tutor@example.com").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/tokens/whiteboard",
        Some(&token),
        Some(json!({ "roomId": "room_s1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["roomId"], "room_s1");
    // The identity always comes from the bearer token
    assert_eq!(body["userId"], "1");
    assert_eq!(body["role"], "admin");
    assert!(body["expiresAt"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_whiteboard_token_role_parsing() {
    let app = whiteboard_app();
    let token = access_token(&app, "tutee@example.com").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/tokens/whiteboard",
        Some(&token),
        Some(json!({ "roomId": "room_s1", "role": "reader" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "reader");

    // Unrecognized roles fall back to admin
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/tokens/whiteboard",
        Some(&token),
        Some(json!({ "roomId": "room_s1", "role": "superuser" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn test_whiteboard_token_missing_room() {
    let app = whiteboard_app();
    let token = access_token(&app, "tutor@example.com").await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/tokens/whiteboard",
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_whiteboard_token_requires_auth() {
    let app = whiteboard_app();

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/tokens/whiteboard",
        None,
        Some(json!({ "roomId": "room_s1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
