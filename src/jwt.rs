//! Session token minting and verification.
//!
//! A session is a single HS256 JWT carrying the user id and username. Nothing
//! is stored server-side, so a token stays valid until its `exp` passes.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Session token duration: 1 hour. Also used as the cookie Max-Age.
pub const SESSION_TOKEN_DURATION_SECS: u64 = 60 * 60;

/// JWT claims as they appear on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user id, decimal string)
    pub sub: String,
    /// Username
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Verified session claim with the subject coerced to a user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaim {
    pub user_id: i64,
    pub username: String,
    pub issued_at: u64,
    pub expires_at: u64,
}

/// Result of minting a session token.
#[derive(Debug, Clone)]
pub struct SessionToken {
    /// The JWT token string
    pub token: String,
    /// Token duration in seconds
    pub duration: u64,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: u64,
}

/// Configuration for JWT operations.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret.
    pub fn new(secret: &[u8]) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::EmptySecret);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        })
    }

    /// Mint a session token for a user, expiring one TTL from now.
    pub fn mint(&self, user_id: i64, username: &str) -> Result<SessionToken, JwtError> {
        self.mint_at(user_id, username, unix_now()?)
    }

    /// Mint a session token as if the current time were `now`.
    pub fn mint_at(
        &self,
        user_id: i64,
        username: &str,
        now: u64,
    ) -> Result<SessionToken, JwtError> {
        let exp = now + SESSION_TOKEN_DURATION_SECS;

        let claims = SessionClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)?;

        Ok(SessionToken {
            token,
            duration: SESSION_TOKEN_DURATION_SECS,
            expires_at: exp,
        })
    }

    /// Validate and decode a session token against the current time.
    pub fn verify(&self, token: &str) -> Result<SessionClaim, JwtError> {
        self.verify_at(token, unix_now()?)
    }

    /// Validate and decode a session token as if the current time were `now`.
    ///
    /// The signature is checked before expiry, so a forged token reports
    /// `InvalidSignature` even when its claimed `exp` has passed.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<SessionClaim, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the supplied clock.
        validation.validate_exp = false;
        validation.leeway = 0;

        let token_data =
            jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)
                .map_err(|e| match e.kind() {
                    ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                    _ => JwtError::Malformed,
                })?;

        let claims = token_data.claims;
        if now > claims.exp {
            return Err(JwtError::Expired);
        }

        let user_id = claims.sub.parse::<i64>().map_err(|_| JwtError::Malformed)?;

        Ok(SessionClaim {
            user_id,
            username: claims.username,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}

fn unix_now() -> Result<u64, JwtError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| JwtError::TimeError)?
        .as_secs())
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Signing secret is empty
    EmptySecret,
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Token could not be parsed or carries unusable claims
    Malformed,
    /// Signature does not match the payload
    InvalidSignature,
    /// Token is past its expiry
    Expired,
    /// System time error
    TimeError,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::EmptySecret => write!(f, "JWT secret must not be empty"),
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Malformed => write!(f, "Malformed token"),
            JwtError::InvalidSignature => write!(f, "Invalid token signature"),
            JwtError::Expired => write!(f, "Token has expired"),
            JwtError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for JwtError {}
