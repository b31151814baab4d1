//! Session authentication.
//!
//! A single HS256 session token lives in an httpOnly cookie. The route guard
//! only checks that the cookie is present; API extractors verify the token
//! and re-resolve its user before a handler runs.

mod cookie;
mod errors;
mod extractors;
mod guard;
mod state;
mod types;

pub use cookie::{SESSION_COOKIE_NAME, clear_cookie, get_cookie, issue_cookie, session_token};
pub use errors::{ApiAuthError, AuthErrorKind};
pub use extractors::{Auth, OptionalAuth};
pub use guard::{Access, GuardOutcome, REDIRECT_PARAM, RouteGuard, route_guard};
pub use state::HasAuthBackend;
pub use types::AuthenticatedUser;
