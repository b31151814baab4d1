//! Axum extractors for authentication.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::cookie::session_token;
use super::errors::{ApiAuthError, AuthErrorKind};
use super::state::HasAuthBackend;
use super::types::AuthenticatedUser;
use crate::jwt::JwtError;

/// Core authentication logic shared by the extractors.
///
/// Verifies the session token's signature and expiry, then re-resolves the
/// subject in the user store so a token that outlives its account is refused.
async fn authenticate_request<S>(parts: &Parts, state: &S) -> Result<AuthenticatedUser, AuthErrorKind>
where
    S: HasAuthBackend + Send + Sync,
{
    let token = session_token(&parts.headers).ok_or(AuthErrorKind::NoToken)?;

    let claim = state.jwt().verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Session token rejected");
        match e {
            JwtError::Expired => AuthErrorKind::ExpiredToken,
            _ => AuthErrorKind::InvalidToken,
        }
    })?;

    let user = state
        .db()
        .users()
        .get_by_id(claim.user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get user: {}", e);
            AuthErrorKind::DatabaseError
        })?
        .ok_or_else(|| {
            tracing::info!(user_id = claim.user_id, "Session token for a deleted user");
            AuthErrorKind::UserNotFound
        })?;

    Ok(AuthenticatedUser {
        user_id: user.userid,
        username: user.username,
    })
}

/// Extractor for API endpoints that require authentication.
/// Rejects with a JSON 401 that says whether the token was missing or bad.
pub struct Auth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authenticate_request(parts, state)
            .await
            .map(Auth)
            .map_err(|kind| ApiAuthError::new(kind, state.secure_cookies()))
    }
}

/// Optional authentication extractor - never fails, returns Option<AuthenticatedUser>.
/// Useful for endpoints that work both authenticated and unauthenticated.
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(authenticate_request(parts, state).await.ok()))
    }
}
