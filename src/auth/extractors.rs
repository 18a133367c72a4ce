//! Axum extractors for authentication.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::errors::AuthError;
use super::state::HasAuthState;
use crate::jwt::Claims;

/// Pull the bearer token out of the `Authorization` header, if present.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Extractor for endpoints that require a verified bearer token.
/// On success the handler receives the decoded access-token claims.
/// This is a pure gate: no state is read or written beyond validation.
pub struct Auth(pub Claims);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthState + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;

        let claims = state
            .jwt()
            .validate_access_token(token)
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(Auth(claims))
    }
}

/// Optional authentication extractor. Never fails; endpoints that work both
/// authenticated and unauthenticated get `Option<Claims>`.
pub struct OptionalAuth(pub Option<Claims>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: HasAuthState + Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims =
            bearer_token(parts).and_then(|t| state.jwt().validate_access_token(t).ok());
        Ok(OptionalAuth(claims))
    }
}
