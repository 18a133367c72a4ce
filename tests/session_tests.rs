mod common;

use axum::http::StatusCode;
use chalkdesk::create_app;
use chalkdesk::sessions::DuplicatePolicy;
use common::{access_token, create_test_app, send_json, test_config};
use serde_json::json;

#[tokio::test]
async fn test_create_session() {
    let app = create_test_app();
    let token = access_token(&app, "tutor@example.com").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/sessions",
        Some(&token),
        Some(json!({ "sessionId": "s1", "tuteeId": "2" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], "s1");
    assert_eq!(body["session"]["tutorId"], "1");
    assert_eq!(body["session"]["tuteeId"], "2");
    assert_eq!(body["session"]["status"], "active");
    assert_eq!(body["session"]["channelName"], "channel_s1");
    assert_eq!(body["session"]["roomId"], "room_s1");
}

#[tokio::test]
async fn test_create_session_missing_id() {
    let app = create_test_app();
    let token = access_token(&app, "tutor@example.com").await;

    let (status, _) =
        send_json(&app, "POST", "/api/sessions", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/sessions",
        Some(&token),
        Some(json!({ "sessionId": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_session_requires_auth() {
    let app = create_test_app();

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/sessions",
        None,
        Some(json!({ "sessionId": "s1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validate_session_participants() {
    let app = create_test_app();
    let tutor = access_token(&app, "tutor@example.com").await;
    let tutee = access_token(&app, "tutee@example.com").await;
    let other = access_token(&app, "tutee2@example.com").await;

    send_json(
        &app,
        "POST",
        "/api/sessions",
        Some(&tutor),
        Some(json!({ "sessionId": "s1", "tuteeId": "2" })),
    )
    .await;

    let (status, body) = send_json(
        &app,
        "GET",
        "/api/sessions/s1/validate",
        Some(&tutor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["session"]["id"], "s1");

    let (status, body) = send_json(
        &app,
        "GET",
        "/api/sessions/s1/validate",
        Some(&tutee),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);

    // Unrelated user: valid=false, not an error
    let (status, body) = send_json(
        &app,
        "GET",
        "/api/sessions/s1/validate",
        Some(&other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert!(body.get("session").is_none());
}

#[tokio::test]
async fn test_validate_unknown_session() {
    let app = create_test_app();
    let token = access_token(&app, "tutor@example.com").await;

    let (status, body) = send_json(
        &app,
        "GET",
        "/api/sessions/missing/validate",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
}

#[tokio::test]
async fn test_end_session_tutor_only() {
    let app = create_test_app();
    let tutor = access_token(&app, "tutor@example.com").await;
    let tutee = access_token(&app, "tutee@example.com").await;

    send_json(
        &app,
        "POST",
        "/api/sessions",
        Some(&tutor),
        Some(json!({ "sessionId": "s1", "tuteeId": "2" })),
    )
    .await;

    let (status, _) =
        send_json(&app, "POST", "/api/sessions/s1/end", Some(&tutee), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) =
        send_json(&app, "POST", "/api/sessions/s1/end", Some(&tutor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["status"], "completed");
}

#[tokio::test]
async fn test_end_session_not_found() {
    let app = create_test_app();
    let token = access_token(&app, "tutor@example.com").await;

    let (status, _) =
        send_json(&app, "POST", "/api/sessions/missing/end", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_end_session_idempotent() {
    let app = create_test_app();
    let tutor = access_token(&app, "tutor@example.com").await;

    send_json(
        &app,
        "POST",
        "/api/sessions",
        Some(&tutor),
        Some(json!({ "sessionId": "s1" })),
    )
    .await;

    let (status, body) =
        send_json(&app, "POST", "/api/sessions/s1/end", Some(&tutor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["status"], "completed");

    let (status, body) =
        send_json(&app, "POST", "/api/sessions/s1/end", Some(&tutor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["status"], "completed");
}

#[tokio::test]
async fn test_duplicate_session_overwrites_by_default() {
    let app = create_test_app();
    let tutor = access_token(&app, "tutor@example.com").await;

    send_json(
        &app,
        "POST",
        "/api/sessions",
        Some(&tutor),
        Some(json!({ "sessionId": "s1" })),
    )
    .await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/sessions",
        Some(&tutor),
        Some(json!({ "sessionId": "s1", "tuteeId": "2" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["tuteeId"], "2");
}

#[tokio::test]
async fn test_duplicate_session_rejected_under_reject_policy() {
    let mut config = test_config();
    config.session_duplicate_policy = DuplicatePolicy::Reject;
    let app = create_app(&config);
    let tutor = access_token(&app, "tutor@example.com").await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/sessions",
        Some(&tutor),
        Some(json!({ "sessionId": "s1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/sessions",
        Some(&tutor),
        Some(json!({ "sessionId": "s1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
