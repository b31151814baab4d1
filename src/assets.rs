//! Embedded page shells.
//!
//! The pages carry no server-side logic: each one loads `/static/app.js`,
//! which talks to the JSON API. Access to them is decided by the route guard.

use axum::{
    Router,
    extract::Path,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "web/"]
pub struct WebAssets;

/// Cache duration for static scripts and styles
const STATIC_CACHE: &str = "public, max-age=3600";
/// HTML must be revalidated so a signed-out user never sees a cached page
const NO_CACHE: &str = "no-cache";

const CSP: &str = "default-src 'self'; script-src 'self'; style-src 'self'; object-src 'none'; frame-ancestors 'none'; base-uri 'self'";

pub fn router() -> Router {
    Router::new()
        .route("/", get(|| async { serve_page("index.html") }))
        .route("/login", get(|| async { serve_page("login.html") }))
        .route("/register", get(|| async { serve_page("register.html") }))
        .route("/ask", get(|| async { serve_page("ask.html") }))
        .route(
            "/answer/{questionid}",
            get(|_: Path<String>| async { serve_page("answer.html") }),
        )
        .route("/static/{*path}", get(static_handler))
}

/// Get MIME type from file extension. Only supports types we actually serve.
fn mime_from_path(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("html") => "text/html; charset=utf-8",
        _ => "application/octet-stream",
    }
}

fn serve_page(name: &str) -> Response {
    match WebAssets::get(name) {
        Some(content) => (
            [
                (header::CONTENT_TYPE, mime_from_path(name)),
                (header::CACHE_CONTROL, NO_CACHE),
                (header::CONTENT_SECURITY_POLICY, CSP),
            ],
            content.data,
        )
            .into_response(),
        None => {
            tracing::error!(page = name, "Page missing from embedded assets");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn static_handler(Path(path): Path<String>) -> Response {
    let path = format!("static/{}", path);
    match WebAssets::get(&path) {
        Some(content) => (
            [
                (header::CONTENT_TYPE, mime_from_path(&path)),
                (header::CACHE_CONTROL, STATIC_CACHE),
            ],
            content.data,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
