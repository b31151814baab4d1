//! Session cookie building and parsing.

use axum::http::{HeaderMap, header};

use crate::jwt::SESSION_TOKEN_DURATION_SECS;

/// Cookie name for the session token.
pub const SESSION_COOKIE_NAME: &str = "sessionToken";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// Extract the session token. An empty value is treated as no session.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    get_cookie(headers, SESSION_COOKIE_NAME).filter(|value| !value.is_empty())
}

/// Build the `Set-Cookie` value that stores a session token.
pub fn issue_cookie(token: &str, secure: bool) -> String {
    session_cookie(token, SESSION_TOKEN_DURATION_SECS, secure)
}

/// Build the `Set-Cookie` value that removes the session cookie.
/// Name, path and flags must match `issue_cookie` or the browser keeps the old one.
pub fn clear_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

fn session_cookie(value: &str, max_age: u64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        SESSION_COOKIE_NAME, value, max_age, secure
    )
}
