//! Session token verification for the HTTP edge.
//!
//! Callers present an HS256 session token as `Authorization: Bearer <token>`.
//! The token's `sub` is the numeric user ID; issuance happens elsewhere, the
//! helper here exists for tooling and tests.

mod extractor;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub use extractor::{AuthError, SessionAuth};

/// Issuer claim expected on every session token.
pub const SESSION_ISSUER: &str = "casebook";

/// HMAC secret used to sign and verify session tokens.
///
/// `Debug` prints `[REDACTED]`; the value is only reachable through
/// `expose_secret()`.
#[derive(Clone)]
pub struct SessionKey(SecretString);

impl SessionKey {
    pub fn new(secret: SecretString) -> Self {
        Self(secret)
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionKey([REDACTED])")
    }
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID, as a decimal string.
    pub sub: String,
    pub iss: String,
    pub exp: usize,
    pub iat: usize,
}

impl SessionClaims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Sign a session token for `user_id`, valid for `ttl_secs`.
pub fn issue_session_token(user_id: i32, key: &SessionKey, ttl_secs: u64) -> AppResult<String> {
    let now = chrono::Utc::now();
    let exp = now + chrono::Duration::seconds(ttl_secs as i64);

    let claims = SessionClaims {
        sub: user_id.to_string(),
        iss: SESSION_ISSUER.to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let encoding_key = EncodingKey::from_secret(key.0.expose_secret().as_bytes());
    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| AppError::InvalidInput(format!("Failed to create session token: {}", e)))
}

/// Verify a session token and return its claims.
pub fn verify_session_token(token: &str, key: &SessionKey) -> Result<SessionClaims, String> {
    let decoding_key = DecodingKey::from_secret(key.0.expose_secret().as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.validate_aud = false;

    let token_data = decode::<SessionClaims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid session token: {}", e))?;

    Ok(token_data.claims)
}
