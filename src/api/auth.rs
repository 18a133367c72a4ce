//! Authentication API endpoints.
//!
//! - POST `/login` - Exchange email/password for a token pair
//! - POST `/logout` - Acknowledge logout (tokens are stateless)
//! - GET `/validate` - Verify the bearer token and return its user
//! - POST `/refresh` - Exchange a refresh token for a new access token

use axum::{
    Json, Router, middleware,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use crate::auth::Auth;
use crate::directory::{PublicUser, UserDirectory};
use crate::impl_has_auth_state;
use crate::jwt::{JwtConfig, TokenPair};
use crate::rate_limit::{RateLimitConfig, rate_limit_login};

#[derive(Clone)]
pub struct AuthApiState {
    pub directory: Arc<UserDirectory>,
    pub jwt: Arc<JwtConfig>,
    pub rate_limit: Arc<RateLimitConfig>,
}

impl_has_auth_state!(AuthApiState);

pub fn router(state: AuthApiState) -> Router {
    let login_routes = Router::new()
        .route("/login", post(login))
        .layer(middleware::from_fn_with_state(
            state.rate_limit.clone(),
            rate_limit_login,
        ))
        .with_state(state.clone());

    let session_routes = Router::new()
        .route("/logout", post(logout))
        .route("/validate", get(validate))
        .route("/refresh", post(refresh))
        .with_state(state);

    login_routes.merge(session_routes)
}

#[derive(Deserialize)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Serialize)]
struct LoginResponse {
    user: PublicUser,
    tokens: TokenPair,
}

/// Authenticate an email/password pair. Unknown email and wrong password
/// produce the same 401; nothing distinguishes the two to the caller.
async fn login(
    State(state): State<AuthApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.email.as_deref().map(str::trim).unwrap_or("");
    let password = payload.password.as_deref().unwrap_or("");

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user = state
        .directory
        .authenticate(email, password)
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    let tokens = state
        .jwt
        .generate_token_pair(user)
        .token_err("Failed to generate tokens")?;

    Ok(Json(LoginResponse {
        user: PublicUser::from(user),
        tokens,
    }))
}

/// Logout. Tokens are stateless and cannot be revoked server-side; the
/// client discards its copies and this endpoint just confirms the intent.
async fn logout(Auth(_claims): Auth) -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Logged out" }))
}

#[derive(Serialize)]
struct ValidateResponse {
    valid: bool,
    user: PublicUser,
}

/// Verify the presented access token and return the user it belongs to.
async fn validate(
    State(state): State<AuthApiState>,
    Auth(claims): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .directory
        .find_by_id(&claims.sub)
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(ValidateResponse {
        valid: true,
        user: PublicUser::from(user),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest {
    refresh_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    expires_in: u64,
}

/// Exchange a valid refresh token for a new access token. The refresh
/// token itself is not rotated.
async fn refresh(
    State(state): State<AuthApiState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = payload
        .refresh_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("refreshToken is required"))?;

    let claims = state
        .jwt
        .validate_refresh_token(refresh_token)
        .map_err(|_| ApiError::unauthorized("Invalid or expired refresh token"))?;

    let user = state
        .directory
        .find_by_id(&claims.sub)
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    let access_token = state
        .jwt
        .generate_access_token(user)
        .token_err("Failed to generate access token")?;

    Ok(Json(RefreshResponse {
        access_token,
        expires_in: state.jwt.access_duration(),
    }))
}
