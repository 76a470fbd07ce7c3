//! HS256 session tokens carrying the caller's [`Identity`].

use fetchboard_core::identity::Identity;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cookie holding the session token.
pub const SESSION_COOKIE: &str = "fetchboard_session";

/// Claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject -- the user id.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier.
    pub jti: String,
}

/// Signing configuration for session tokens.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Token lifetime in hours.
    pub ttl_hours: i64,
}

/// Mint a session token for `identity`.
pub fn issue_session_token(
    identity: &Identity,
    config: &SessionConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        sub: identity.user_id.clone(),
        login: identity.login.clone(),
        name: identity.name.clone(),
        avatar: identity.avatar.clone(),
        exp: now + config.ttl_hours * 3600,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate a session token and recover the identity it was issued for.
pub fn validate_session_token(
    token: &str,
    config: &SessionConfig,
) -> Result<Identity, jsonwebtoken::errors::Error> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    let claims = data.claims;
    Ok(Identity {
        user_id: claims.sub,
        login: claims.login,
        name: claims.name,
        avatar: claims.avatar,
    })
}
