mod auth;
mod error;
mod sessions;
mod tokens;
mod upload;
mod whiteboard;

use axum::Router;
use std::sync::Arc;

use crate::convert::ConversionClient;
use crate::directory::UserDirectory;
use crate::jwt::JwtConfig;
use crate::rate_limit::RateLimitConfig;
use crate::sessions::SessionRegistry;
use crate::tokens::{RtcConfig, WhiteboardConfig};
use crate::uploads::DocumentStore;

pub use error::ApiError;
pub use upload::{UploadState, serve_document};

/// Create the API router.
pub fn create_api_router(
    directory: Arc<UserDirectory>,
    jwt: Arc<JwtConfig>,
    registry: Arc<SessionRegistry>,
    rtc: RtcConfig,
    whiteboard: WhiteboardConfig,
    convert: Arc<ConversionClient>,
    documents: Arc<DocumentStore>,
) -> Router {
    let rate_limit = Arc::new(RateLimitConfig::new());

    let auth_state = auth::AuthApiState {
        directory,
        jwt: jwt.clone(),
        rate_limit,
    };

    let tokens_state = tokens::TokensState {
        jwt: jwt.clone(),
        rtc,
        whiteboard,
    };

    let sessions_state = sessions::SessionsState { jwt, registry };

    let whiteboard_state = whiteboard::WhiteboardState { convert };

    let upload_state = UploadState { documents };

    Router::new()
        .nest("/auth", auth::router(auth_state))
        .nest("/tokens", tokens::router(tokens_state))
        .nest("/sessions", sessions::router(sessions_state))
        .nest("/whiteboard", whiteboard::router(whiteboard_state))
        .nest("/upload", upload::router(upload_state))
}
