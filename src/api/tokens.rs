//! Third-party token issuance API endpoints.
//!
//! - POST `/rtc` - Issue a video-call channel token
//! - POST `/whiteboard` - Issue a whiteboard room token
//!
//! Both require a verified bearer token; the whiteboard token is always
//! issued for the authenticated user, never a caller-supplied identity.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;

use super::error::ApiError;
use crate::auth::Auth;
use crate::impl_has_auth_state;
use crate::jwt::JwtConfig;
use crate::tokens::{RoomRole, RtcConfig, RtcRole, TokenError, WhiteboardConfig};

#[derive(Clone)]
pub struct TokensState {
    pub jwt: Arc<JwtConfig>,
    pub rtc: RtcConfig,
    pub whiteboard: WhiteboardConfig,
}

impl_has_auth_state!(TokensState);

pub fn router(state: TokensState) -> Router {
    Router::new()
        .route("/rtc", post(issue_rtc_token))
        .route("/whiteboard", post(issue_whiteboard_token))
        .with_state(state)
}

fn token_error(e: TokenError) -> ApiError {
    match e {
        TokenError::Unconfigured(_) => ApiError::internal(e.to_string()),
        TokenError::Signing(_) => ApiError::upstream("Token signing failed", e),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RtcTokenRequest {
    channel_name: Option<String>,
    role: Option<String>,
    uid: Option<u32>,
}

/// Issue an RTC channel grant. Without a signing certificate the token is
/// `null` (development mode); the rest of the grant is still returned.
async fn issue_rtc_token(
    State(state): State<TokensState>,
    Auth(_claims): Auth,
    Json(payload): Json<RtcTokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let channel = payload
        .channel_name
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("channelName is required"))?;

    let role = RtcRole::from_param(payload.role.as_deref());
    // Random uid when the caller does not pick one; collisions are not
    // checked.
    let uid = payload
        .uid
        .unwrap_or_else(|| rand::rng().random_range(1..1_000_000));

    let grant = state.rtc.generate(channel, uid, role).map_err(token_error)?;

    Ok(Json(grant))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WhiteboardTokenRequest {
    room_id: Option<String>,
    role: Option<String>,
}

/// Issue a whiteboard room token for the authenticated user.
async fn issue_whiteboard_token(
    State(state): State<TokensState>,
    Auth(claims): Auth,
    Json(payload): Json<WhiteboardTokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let room_id = payload
        .room_id
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ApiError::bad_request("roomId is required"))?;

    let role = RoomRole::from_param(payload.role.as_deref());

    let grant = state
        .whiteboard
        .generate(room_id, &claims.sub, role)
        .map_err(token_error)?;

    Ok(Json(grant))
}
