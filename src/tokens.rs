//! Third-party session token issuance.
//!
//! Two builders live here: the RTC (video-call) token builder, which signs
//! a channel grant with the media certificate, and the whiteboard room
//! token builder. Both run in degraded mode when their credentials are
//! absent from the environment; see the individual contracts.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use openssl::hash::MessageDigest;
use openssl::pkey::PKey;
use openssl::sign::Signer;
use serde::Serialize;

/// Privilege window for issued tokens: 24 hours.
pub const TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// Errors from token issuance.
#[derive(Debug)]
pub enum TokenError {
    /// A required credential is not configured
    Unconfigured(&'static str),
    /// HMAC signing failed
    Signing(openssl::error::ErrorStack),
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Unconfigured(what) => write!(f, "{} is not configured", what),
            TokenError::Signing(e) => write!(f, "Failed to sign token: {}", e),
        }
    }
}

impl std::error::Error for TokenError {}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, TokenError> {
    let key = PKey::hmac(key).map_err(TokenError::Signing)?;
    let mut signer = Signer::new(MessageDigest::sha256(), &key).map_err(TokenError::Signing)?;
    signer.update(data).map_err(TokenError::Signing)?;
    signer.sign_to_vec().map_err(TokenError::Signing)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// RTC tokens
// ---------------------------------------------------------------------------

/// Role inside an RTC channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RtcRole {
    Publisher,
    Subscriber,
}

impl RtcRole {
    /// Numeric role encoding used in the signed grant.
    pub fn privilege(&self) -> u8 {
        match self {
            RtcRole::Publisher => 1,
            RtcRole::Subscriber => 2,
        }
    }

    /// Parse a request parameter. Missing or unrecognized values fall back
    /// to `Publisher`.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("subscriber") => RtcRole::Subscriber,
            _ => RtcRole::Publisher,
        }
    }
}

/// RTC credentials: the application id is required to issue anything; the
/// certificate is optional and its absence switches the builder into
/// unsigned development mode.
#[derive(Debug, Clone, Default)]
pub struct RtcConfig {
    pub app_id: Option<String>,
    pub certificate: Option<String>,
}

/// An issued RTC channel grant. `token` is `None` in development mode
/// (no signing certificate configured); callers must treat a null token as
/// "unsigned" and not present it to a production media server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RtcGrant {
    pub token: Option<String>,
    pub uid: u32,
    pub channel_name: String,
    pub expires_at: u64,
}

impl RtcConfig {
    pub fn is_configured(&self) -> bool {
        self.app_id.is_some()
    }

    /// Issue a grant for joining `channel` as `uid`. With a certificate the
    /// token is an HMAC-SHA256 signature over the grant fields; the media
    /// server shares the certificate and recomputes it.
    pub fn generate(
        &self,
        channel: &str,
        uid: u32,
        role: RtcRole,
    ) -> Result<RtcGrant, TokenError> {
        let app_id = self
            .app_id
            .as_deref()
            .ok_or(TokenError::Unconfigured("RTC app id"))?;

        let expires_at = now_secs() + TOKEN_TTL_SECS;

        let token = match self.certificate.as_deref() {
            None => None,
            Some(certificate) => {
                let payload =
                    format!("{}:{}:{}:{}:{}", app_id, channel, uid, role.privilege(), expires_at);
                let sig = hmac_sha256(certificate.as_bytes(), payload.as_bytes())?;
                Some(format!(
                    "{}.{}",
                    URL_SAFE_NO_PAD.encode(payload.as_bytes()),
                    URL_SAFE_NO_PAD.encode(sig)
                ))
            }
        };

        Ok(RtcGrant {
            token,
            uid,
            channel_name: channel.to_string(),
            expires_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Whiteboard room tokens
// ---------------------------------------------------------------------------

/// Role inside a whiteboard room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomRole {
    Admin,
    Writer,
    Reader,
}

impl RoomRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomRole::Admin => "admin",
            RoomRole::Writer => "writer",
            RoomRole::Reader => "reader",
        }
    }

    /// Parse a request parameter. Missing or unrecognized values fall back
    /// to `Admin`.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("writer") => RoomRole::Writer,
            Some("reader") => RoomRole::Reader,
            _ => RoomRole::Admin,
        }
    }
}

/// Whiteboard credentials. Both the application id and the secret must be
/// configured before any room token is issued.
#[derive(Debug, Clone, Default)]
pub struct WhiteboardConfig {
    pub app_id: Option<String>,
    pub secret: Option<String>,
}

/// An issued whiteboard room grant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTokenGrant {
    pub token: String,
    pub room_id: String,
    pub user_id: String,
    pub role: RoomRole,
    pub expires_at: u64,
}

impl WhiteboardConfig {
    pub fn is_configured(&self) -> bool {
        self.app_id.is_some() && self.secret.is_some()
    }

    /// Issue a room token for `user_id` in `room_id`.
    ///
    /// The token is a placeholder pending real whiteboard API integration:
    /// it encodes room id, user id, role and expiry with an HMAC tag, but
    /// the whiteboard service does not verify it. It is NOT a security
    /// boundary and callers must not treat it as one.
    pub fn generate(
        &self,
        room_id: &str,
        user_id: &str,
        role: RoomRole,
    ) -> Result<RoomTokenGrant, TokenError> {
        let secret = match (&self.app_id, &self.secret) {
            (Some(_), Some(secret)) => secret,
            _ => return Err(TokenError::Unconfigured("Whiteboard credentials")),
        };

        let expires_at = now_secs() + TOKEN_TTL_SECS;
        let payload = format!("{}:{}:{}:{}", room_id, user_id, role.as_str(), expires_at);
        let tag = hmac_sha256(secret.as_bytes(), payload.as_bytes())?;

        Ok(RoomTokenGrant {
            token: format!(
                "{}.{}",
                URL_SAFE_NO_PAD.encode(payload.as_bytes()),
                URL_SAFE_NO_PAD.encode(tag)
            ),
            room_id: room_id.to_string(),
            user_id: user_id.to_string(),
            role,
            expires_at,
        })
    }

    /// Build the authentication token sent with conversion API calls:
    /// the application id and a timestamp, tagged with the secret.
    pub fn api_token(&self) -> Result<String, TokenError> {
        let (app_id, secret) = match (&self.app_id, &self.secret) {
            (Some(app_id), Some(secret)) => (app_id, secret),
            _ => return Err(TokenError::Unconfigured("Whiteboard credentials")),
        };

        let payload = format!("{}:{}", app_id, now_secs());
        let tag = hmac_sha256(secret.as_bytes(), payload.as_bytes())?;
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            URL_SAFE_NO_PAD.encode(tag)
        ))
    }
}
