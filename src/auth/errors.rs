//! Authentication error types.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::cookie::clear_cookie;

/// Why a request could not be authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// No session cookie was sent
    NoToken,
    /// Cookie present but the token is forged or unparseable
    InvalidToken,
    /// Token signature is fine but its expiry has passed
    ExpiredToken,
    /// Token is valid but its user no longer exists
    UserNotFound,
    DatabaseError,
}

/// API authentication errors (returns JSON, clears stale session cookies).
#[derive(Debug)]
pub struct ApiAuthError {
    pub kind: AuthErrorKind,
    secure_cookies: bool,
}

impl ApiAuthError {
    pub(super) fn new(kind: AuthErrorKind, secure_cookies: bool) -> Self {
        Self {
            kind,
            secure_cookies,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.kind {
            AuthErrorKind::NoToken
            | AuthErrorKind::InvalidToken
            | AuthErrorKind::ExpiredToken
            | AuthErrorKind::UserNotFound => StatusCode::UNAUTHORIZED,
            AuthErrorKind::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self.kind {
            AuthErrorKind::NoToken => "Unauthorized: No token provided",
            AuthErrorKind::InvalidToken => "Unauthorized: Invalid or expired token",
            AuthErrorKind::ExpiredToken => "Unauthorized: Token expired",
            AuthErrorKind::UserNotFound => "Unauthorized: User not found",
            AuthErrorKind::DatabaseError => "Internal server error",
        }
    }

    /// Whether the client's cookie is known to be useless and should be dropped.
    fn clears_cookie(&self) -> bool {
        matches!(
            self.kind,
            AuthErrorKind::InvalidToken | AuthErrorKind::ExpiredToken | AuthErrorKind::UserNotFound
        )
    }
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        let mut response = (
            self.status_code(),
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response();

        if self.clears_cookie() {
            if let Ok(value) = HeaderValue::from_str(&clear_cookie(self.secure_cookies)) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }

        response
    }
}
