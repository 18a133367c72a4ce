pub mod api;
pub mod auth;
pub mod cli;
pub mod convert;
pub mod directory;
pub mod jwt;
pub mod rate_limit;
pub mod sessions;
pub mod tokens;
pub mod uploads;

use api::{UploadState, create_api_router, serve_document};
use axum::{Json, Router, http::HeaderValue, routing::get};
use convert::ConversionClient;
use directory::UserDirectory;
use jwt::JwtConfig;
use sessions::{DuplicatePolicy, SessionRegistry};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokens::{RtcConfig, WhiteboardConfig};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uploads::DocumentStore;

pub struct ServerConfig {
    /// Seeded user directory (immutable for the process lifetime)
    pub directory: Arc<UserDirectory>,
    /// JWT secret for signing tokens
    pub jwt_secret: Vec<u8>,
    /// Access token lifetime as a duration string (e.g. "24h")
    pub access_token_ttl: String,
    /// Refresh token lifetime as a duration string (e.g. "7d")
    pub refresh_token_ttl: String,
    /// RTC credentials; certificate may be absent (unsigned dev mode)
    pub rtc: RtcConfig,
    /// Whiteboard credentials; both parts required for room tokens
    pub whiteboard: WhiteboardConfig,
    /// Base URL of the external conversion API
    pub convert_api_base: String,
    /// Directory uploaded documents are stored in
    pub upload_dir: PathBuf,
    /// Externally resolvable URL this server is reachable at
    pub public_url: String,
    /// Allowed CORS origin; `None` allows any origin
    pub cors_origin: Option<String>,
    /// What to do when a session id is reused
    pub session_duplicate_policy: DuplicatePolicy,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(JwtConfig::new(
        &config.jwt_secret,
        &config.access_token_ttl,
        &config.refresh_token_ttl,
    ));
    let registry = Arc::new(SessionRegistry::new(config.session_duplicate_policy));
    let convert = Arc::new(ConversionClient::new(
        &config.convert_api_base,
        config.whiteboard.clone(),
    ));
    let documents = Arc::new(
        DocumentStore::new(&config.upload_dir, &config.public_url)
            .expect("Failed to create upload directory"),
    );

    let api_router = create_api_router(
        config.directory.clone(),
        jwt,
        registry,
        config.rtc.clone(),
        config.whiteboard.clone(),
        convert,
        documents.clone(),
    );

    let upload_routes = Router::new()
        .route("/uploads/{name}", get(serve_document))
        .with_state(UploadState { documents });

    let cors = match &config.cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .expect("Invalid CORS origin"),
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    Router::new()
        .route("/", get(root_handler))
        .nest("/api", api_router)
        .merge(upload_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "service": "chalkdesk", "status": "ok" }))
}

/// Run the server on the given listener. This function blocks until the
/// server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}

/// Start the server on the given port in a background task. Use port 0 to
/// let the OS choose a random port. Returns the actual listening address.
/// Note: For production use, prefer `run_server` directly in main.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> (tokio::task::JoinHandle<()>, SocketAddr) {
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
    let local_addr = listener.local_addr().expect("Failed to get local address");

    let handle = tokio::spawn(async move {
        run_server(config, listener).await.ok();
    });

    (handle, local_addr)
}
