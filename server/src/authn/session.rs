//! Session token verification
//!
//! Sessions are issued by the external identity provider; this service
//! only checks that a request carries a valid, unexpired session JWT.
//! The token is read from the `Authorization: Bearer` header or, for
//! browser requests, the `__session` cookie.

use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Name of the session cookie set by the identity provider
pub const SESSION_COOKIE: &str = "__session";

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    #[serde(default)]
    pub iss: Option<String>,
}

/// Session verifier trait for testability
pub trait SessionVerifierExt: Send + Sync {
    /// Verify a raw session token, returning its claims
    fn verify(&self, raw: &str) -> Result<SessionClaims, AppError>;
}

/// HS256 session verifier backed by the identity provider's signing secret
pub struct JwtSessionVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionVerifier {
    /// Create a verifier from the shared signing secret
    pub fn new(secret: &SecretString) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl SessionVerifierExt for JwtSessionVerifier {
    fn verify(&self, raw: &str) -> Result<SessionClaims, AppError> {
        let token_data = decode::<SessionClaims>(raw, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::AuthError(format!("Invalid session token: {}", e)))?;

        Ok(token_data.claims)
    }
}

/// Extract the raw session token from request headers
///
/// The Authorization header wins over the session cookie when both are set.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    for cookie_header in headers.get_all(header::COOKIE) {
        let Ok(cookies) = cookie_header.to_str() else {
            continue;
        };
        for cookie in cookies.split(';') {
            if let Some((name, value)) = cookie.trim().split_once('=') {
                if name == SESSION_COOKIE && !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }

    None
}
