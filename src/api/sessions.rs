//! Session API endpoints.
//!
//! - POST `/` - Create a session owned by the caller
//! - GET `/{id}/validate` - Check whether the caller may join
//! - POST `/{id}/end` - Mark a session completed (tutor only)

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::ApiError;
use crate::auth::Auth;
use crate::impl_has_auth_state;
use crate::jwt::JwtConfig;
use crate::sessions::{Session, SessionError, SessionRegistry};

#[derive(Clone)]
pub struct SessionsState {
    pub jwt: Arc<JwtConfig>,
    pub registry: Arc<SessionRegistry>,
}

impl_has_auth_state!(SessionsState);

pub fn router(state: SessionsState) -> Router {
    Router::new()
        .route("/", post(create_session))
        .route("/{id}/validate", get(validate_session))
        .route("/{id}/end", post(end_session))
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest {
    session_id: Option<String>,
    tutee_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
    session_id: String,
    session: Session,
}

/// Create a session with the caller as tutor.
async fn create_session(
    State(state): State<SessionsState>,
    Auth(claims): Auth,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = payload
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("sessionId is required"))?;

    let session = state
        .registry
        .create(session_id, &claims.sub, payload.tutee_id)
        .map_err(|e| match e {
            SessionError::DuplicateId => ApiError::conflict(e.to_string()),
            _ => ApiError::internal(e.to_string()),
        })?;

    Ok(Json(CreateSessionResponse {
        session_id: session_id.to_string(),
        session,
    }))
}

#[derive(Serialize)]
struct ValidateSessionResponse {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<Session>,
}

/// Check whether the caller is the session's tutor or tutee. Unknown ids
/// and unrelated callers both answer `valid: false`; this never errors.
async fn validate_session(
    State(state): State<SessionsState>,
    Auth(claims): Auth,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let session = state.registry.validate(&id, &claims.sub);
    Json(ValidateSessionResponse {
        valid: session.is_some(),
        session,
    })
}

#[derive(Serialize)]
struct EndSessionResponse {
    message: &'static str,
    session: Session,
}

/// End a session. Tutor only; ending an already-completed session is a
/// no-op success.
async fn end_session(
    State(state): State<SessionsState>,
    Auth(claims): Auth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.registry.end(&id, &claims.sub).map_err(|e| match e {
        SessionError::NotFound => ApiError::not_found("Session not found"),
        SessionError::NotTutor => ApiError::forbidden(e.to_string()),
        SessionError::DuplicateId => ApiError::internal(e.to_string()),
    })?;

    Ok(Json(EndSessionResponse {
        message: "Session ended",
        session,
    }))
}
