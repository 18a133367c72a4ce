//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::directory::UserDirectory;
use crate::sessions::DuplicatePolicy;
use crate::tokens::{RtcConfig, WhiteboardConfig};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, warn};

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
pub enum SessionDuplicatePolicy {
    /// Replace the existing session record (historical behavior)
    #[default]
    Overwrite,
    /// Refuse creation with a conflict error
    Reject,
}

impl From<SessionDuplicatePolicy> for DuplicatePolicy {
    fn from(policy: SessionDuplicatePolicy) -> Self {
        match policy {
            SessionDuplicatePolicy::Overwrite => DuplicatePolicy::Overwrite,
            SessionDuplicatePolicy::Reject => DuplicatePolicy::Reject,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "Chalkdesk", about = "Virtual classroom backend")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5000", env = "PORT")]
    pub port: u16,

    /// Externally resolvable URL this server is reachable at.
    /// Defaults to http://localhost:<port>; uploaded-document URLs are
    /// built from it, so set it when running behind a proxy
    #[arg(long, env = "PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Directory uploaded documents are stored in
    #[arg(long, default_value = "uploads", env = "UPLOAD_DIR")]
    pub upload_dir: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Access token lifetime (e.g. "45m", "24h")
    #[arg(long, default_value = "24h", env = "ACCESS_TOKEN_TTL")]
    pub access_token_ttl: String,

    /// Refresh token lifetime (e.g. "7d")
    #[arg(long, default_value = "7d", env = "REFRESH_TOKEN_TTL")]
    pub refresh_token_ttl: String,

    /// RTC application id
    #[arg(long, env = "RTC_APP_ID")]
    pub rtc_app_id: Option<String>,

    /// RTC signing certificate. Without it RTC tokens are issued unsigned
    /// (development mode)
    #[arg(long, env = "RTC_CERTIFICATE")]
    pub rtc_certificate: Option<String>,

    /// Whiteboard application id
    #[arg(long, env = "WHITEBOARD_APP_ID")]
    pub whiteboard_app_id: Option<String>,

    /// Whiteboard application secret
    #[arg(long, env = "WHITEBOARD_SECRET")]
    pub whiteboard_secret: Option<String>,

    /// Base URL of the external document-conversion API
    #[arg(
        long,
        default_value = "https://api.netless.link/v5",
        env = "CONVERT_API_BASE"
    )]
    pub convert_api_base: String,

    /// Allowed CORS origin (any origin when unset)
    #[arg(long, env = "CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// What to do when a session is created with an existing id
    #[arg(long, value_enum, default_value_t = SessionDuplicatePolicy::Overwrite)]
    pub session_duplicate_policy: SessionDuplicatePolicy,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Warn about absent third-party credentials. None of these abort startup:
/// the affected routes answer with a configuration error (token issuance)
/// or reject requests (conversion) until the credentials are supplied.
pub fn warn_missing_credentials(args: &Args) {
    if args.rtc_app_id.is_none() {
        warn!("RTC_APP_ID is not set; RTC token issuance will fail");
    } else if args.rtc_certificate.is_none() {
        warn!("RTC_CERTIFICATE is not set; RTC tokens will be issued unsigned (dev mode)");
    }

    if args.whiteboard_app_id.is_none() || args.whiteboard_secret.is_none() {
        warn!(
            "WHITEBOARD_APP_ID/WHITEBOARD_SECRET are not set; whiteboard tokens and \
             document conversion will be unavailable"
        );
    }
}

/// Build ServerConfig from validated arguments.
pub fn build_config(args: &Args, jwt_secret: String) -> ServerConfig {
    let public_url = args
        .public_url
        .clone()
        .unwrap_or_else(|| format!("http://localhost:{}", args.port));

    ServerConfig {
        directory: Arc::new(UserDirectory::seeded()),
        jwt_secret: jwt_secret.into_bytes(),
        access_token_ttl: args.access_token_ttl.clone(),
        refresh_token_ttl: args.refresh_token_ttl.clone(),
        rtc: RtcConfig {
            app_id: args.rtc_app_id.clone(),
            certificate: args.rtc_certificate.clone(),
        },
        whiteboard: WhiteboardConfig {
            app_id: args.whiteboard_app_id.clone(),
            secret: args.whiteboard_secret.clone(),
        },
        convert_api_base: args.convert_api_base.clone(),
        upload_dir: args.upload_dir.clone().into(),
        public_url,
        cors_origin: args.cors_origin.clone(),
        session_duplicate_policy: args.session_duplicate_policy.into(),
    }
}
