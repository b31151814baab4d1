//! Edge route guard.
//!
//! Every request is classified against an allow-list of public paths. A
//! protected path requested without a session cookie is redirected to the
//! login page with the original destination in `?redirect=`.
//!
//! Only the cookie's presence is checked here. Signature and expiry are
//! verified by the API extractors, so a forged or expired cookie gets past
//! the guard to a page shell but never past an API handler.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::cookie::session_token;

/// Query parameter carrying the originally requested path.
pub const REDIRECT_PARAM: &str = "redirect";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    PassThrough,
    /// Redirect to the contained login URL
    RedirectToLogin(String),
}

/// Allow-list of paths reachable without a session. Anything not listed is
/// protected, so newly added pages require a session until listed here.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    login_path: String,
    public_paths: Vec<String>,
    public_prefixes: Vec<String>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new("/login")
            .with_public_path("/")
            .with_public_path("/login")
            .with_public_path("/register")
            .with_public_path("/favicon.ico")
            .with_public_prefix("/api/")
            .with_public_prefix("/static/")
    }
}

impl RouteGuard {
    /// Create a guard with an empty allow-list. The login path is not public
    /// until added with `with_public_path`.
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            public_paths: Vec::new(),
            public_prefixes: Vec::new(),
        }
    }

    /// Allow an exact path.
    pub fn with_public_path(mut self, path: impl Into<String>) -> Self {
        self.public_paths.push(path.into());
        self
    }

    /// Allow every path starting with `prefix`.
    pub fn with_public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_prefixes.push(prefix.into());
        self
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn classify(&self, path: &str) -> Access {
        let exact = self.public_paths.iter().any(|p| p == path);
        let prefixed = self.public_prefixes.iter().any(|p| path.starts_with(p.as_str()));
        if exact || prefixed {
            Access::Public
        } else {
            Access::Protected
        }
    }

    /// Decide what to do with a request for `path` (plus optional query string).
    pub fn evaluate(&self, path: &str, query: Option<&str>, has_session: bool) -> GuardOutcome {
        if has_session || self.classify(path) == Access::Public {
            return GuardOutcome::PassThrough;
        }
        GuardOutcome::RedirectToLogin(self.login_redirect(path, query))
    }

    fn login_redirect(&self, path: &str, query: Option<&str>) -> String {
        let target = match query {
            Some(q) if !q.is_empty() => format!("{}?{}", path, q),
            _ => path.to_string(),
        };
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(REDIRECT_PARAM, &target)
            .finish();
        format!("{}?{}", self.login_path, query)
    }
}

/// Middleware applying the guard to every request.
pub async fn route_guard(
    State(guard): State<Arc<RouteGuard>>,
    request: Request,
    next: Next,
) -> Response {
    let has_session = session_token(request.headers()).is_some();
    let uri = request.uri();

    match guard.evaluate(uri.path(), uri.query(), has_session) {
        GuardOutcome::PassThrough => next.run(request).await,
        GuardOutcome::RedirectToLogin(location) => {
            tracing::debug!(location = %location, "Redirecting anonymous request to login");
            Redirect::temporary(&location).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{self, StatusCode, header},
        middleware,
        routing::get,
    };
    use tower::ServiceExt;

    #[test]
    fn test_classify_default_allow_list() {
        let guard = RouteGuard::default();

        assert_eq!(guard.classify("/"), Access::Public);
        assert_eq!(guard.classify("/login"), Access::Public);
        assert_eq!(guard.classify("/register"), Access::Public);
        assert_eq!(guard.classify("/api/questions"), Access::Public);
        assert_eq!(guard.classify("/static/app.js"), Access::Public);

        assert_eq!(guard.classify("/ask"), Access::Protected);
        assert_eq!(guard.classify("/answer/abc"), Access::Protected);
        assert_eq!(guard.classify("/brand-new-page"), Access::Protected);
        // Exact entries do not leak to sub-paths
        assert_eq!(guard.classify("/login/extra"), Access::Protected);
        assert_eq!(guard.classify("/api"), Access::Protected);
    }

    #[test]
    fn test_public_path_without_cookie_passes() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.evaluate("/register", None, false),
            GuardOutcome::PassThrough
        );
    }

    #[test]
    fn test_protected_path_without_cookie_redirects() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.evaluate("/ask", None, false),
            GuardOutcome::RedirectToLogin("/login?redirect=%2Fask".to_string())
        );
    }

    #[test]
    fn test_redirect_preserves_query() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.evaluate("/answer/q1", Some("focus=1&x=y"), false),
            GuardOutcome::RedirectToLogin(
                "/login?redirect=%2Fanswer%2Fq1%3Ffocus%3D1%26x%3Dy".to_string()
            )
        );
    }

    #[test]
    fn test_any_path_with_cookie_passes() {
        let guard = RouteGuard::default();
        for path in ["/", "/ask", "/answer/q1", "/unknown"] {
            assert_eq!(guard.evaluate(path, None, true), GuardOutcome::PassThrough);
        }
    }

    #[test]
    fn test_custom_login_path() {
        let guard = RouteGuard::new("/signin").with_public_path("/signin");
        assert_eq!(guard.login_path(), "/signin");
        assert_eq!(guard.classify("/"), Access::Protected);
        assert_eq!(
            guard.evaluate("/", None, false),
            GuardOutcome::RedirectToLogin("/signin?redirect=%2F".to_string())
        );
    }

    fn guarded_app() -> Router {
        Router::new()
            .route("/", get(|| async { "home" }))
            .route("/ask", get(|| async { "ask" }))
            .layer(middleware::from_fn_with_state(
                Arc::new(RouteGuard::default()),
                route_guard,
            ))
    }

    #[tokio::test]
    async fn test_middleware_redirects_anonymous() {
        let response = guarded_app()
            .oneshot(http::Request::builder().uri("/ask").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login?redirect=%2Fask"
        );
    }

    #[tokio::test]
    async fn test_middleware_passes_unverified_cookie() {
        let response = guarded_app()
            .oneshot(
                http::Request::builder()
                    .uri("/ask")
                    .header(header::COOKIE, "sessionToken=not-even-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_passes_public_path() {
        let response = guarded_app()
            .oneshot(http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
