//! JWT token generation and validation.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::directory::{User, UserRole};

/// Token type for distinguishing access vs refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived access token presented as a bearer credential
    Access,
    /// Long-lived refresh token, exchanged for new access tokens
    Refresh,
}

/// JWT claims carried by both access and refresh tokens.
///
/// Tokens are stateless: nothing is stored server-side and there is no
/// revocation list. A token stays valid until `exp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// User email
    pub email: String,
    /// User role
    pub role: UserRole,
    /// Token type
    #[serde(rename = "typ")]
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Fallback lifetime when a duration string cannot be parsed: 24 hours.
pub const DEFAULT_TOKEN_DURATION_SECS: u64 = 24 * 60 * 60;

/// Parse a duration string of the form `<integer><unit>` with unit one of
/// `s`, `m`, `h`, `d`. Anything else yields [`DEFAULT_TOKEN_DURATION_SECS`].
pub fn parse_duration_secs(s: &str) -> u64 {
    let s = s.trim();
    let Some(unit) = s.chars().last() else {
        return DEFAULT_TOKEN_DURATION_SECS;
    };
    let Ok(value) = s[..s.len() - unit.len_utf8()].parse::<u64>() else {
        return DEFAULT_TOKEN_DURATION_SECS;
    };
    match unit {
        's' => value,
        'm' => value * 60,
        'h' => value * 3600,
        'd' => value * 86400,
        _ => DEFAULT_TOKEN_DURATION_SECS,
    }
}

/// Configuration for JWT operations.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_duration: u64,
    refresh_duration: u64,
}

/// An access/refresh token pair issued on login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret and token
    /// lifetimes (duration strings such as `24h` or `7d`).
    pub fn new(secret: &[u8], access_ttl: &str, refresh_ttl: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_duration: parse_duration_secs(access_ttl),
            refresh_duration: parse_duration_secs(refresh_ttl),
        }
    }

    /// Access token lifetime in seconds.
    pub fn access_duration(&self) -> u64 {
        self.access_duration
    }

    fn encode(
        &self,
        user: &User,
        token_type: TokenType,
        duration: u64,
    ) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| JwtError::TimeError)?
            .as_secs();

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            token_type,
            iat: now,
            exp: now + duration,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user: &User) -> Result<String, JwtError> {
        self.encode(user, TokenType::Access, self.access_duration)
    }

    /// Generate a fresh access/refresh token pair for a user.
    pub fn generate_token_pair(&self, user: &User) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.encode(user, TokenType::Access, self.access_duration)?,
            refresh_token: self.encode(user, TokenType::Refresh, self.refresh_duration)?,
            expires_in: self.access_duration,
        })
    }

    fn validate(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(JwtError::Decoding)?;

        if token_data.claims.token_type != expected {
            return Err(JwtError::WrongTokenType);
        }

        Ok(token_data.claims)
    }

    /// Validate and decode an access token.
    /// Any verification failure (malformed, bad signature, expired, wrong
    /// type) is an error; callers treat all of them as "invalid or expired".
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate(token, TokenType::Access)
    }

    /// Validate and decode a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate(token, TokenType::Refresh)
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Error decoding the token
    Decoding(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
    /// Wrong token type (e.g., using a refresh token as an access token)
    WrongTokenType,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Decoding(e) => write!(f, "Failed to decode token: {}", e),
            JwtError::TimeError => write!(f, "System time error"),
            JwtError::WrongTokenType => write!(f, "Wrong token type"),
        }
    }
}

impl std::error::Error for JwtError {}
