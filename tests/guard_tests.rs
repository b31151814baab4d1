mod common;

use axum::http::{StatusCode, header};
use common::setup;

#[tokio::test]
async fn test_public_pages_without_cookie() {
    let app = setup().await;

    for path in ["/", "/login", "/register"] {
        let response = app.get(path, None).await;
        assert_eq!(response.status, StatusCode::OK, "{}", path);
        assert!(
            response.headers[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/html"),
            "{}",
            path
        );
    }
}

#[tokio::test]
async fn test_protected_page_redirects_to_login() {
    let app = setup().await;

    let response = app.get("/ask", None).await;

    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.location(), Some("/login?redirect=%2Fask"));
}

#[tokio::test]
async fn test_redirect_keeps_original_path_and_query() {
    let app = setup().await;

    let response = app.get("/answer/abc-123?from=list", None).await;

    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.location(),
        Some("/login?redirect=%2Fanswer%2Fabc-123%3Ffrom%3Dlist")
    );
}

#[tokio::test]
async fn test_unlisted_path_is_protected() {
    let app = setup().await;

    let response = app.get("/settings", None).await;

    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.location(), Some("/login?redirect=%2Fsettings"));
}

#[tokio::test]
async fn test_protected_pages_with_session() {
    let app = setup().await;
    let cookie = app.register_and_login("alice").await;

    for path in ["/ask", "/answer/some-question"] {
        let response = app.get(path, Some(&cookie)).await;
        assert_eq!(response.status, StatusCode::OK, "{}", path);
    }
}

#[tokio::test]
async fn test_guard_checks_presence_only() {
    let app = setup().await;
    let forged = "sessionToken=forged";

    // The page shell is served
    let page = app.get("/ask", Some(forged)).await;
    assert_eq!(page.status, StatusCode::OK);

    // But the API refuses the token
    let api = app
        .post(
            "/api/ask",
            serde_json::json!({"title": "t", "description": "d"}),
            Some(forged),
        )
        .await;
    assert_eq!(api.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_empty_cookie_is_anonymous() {
    let app = setup().await;

    let response = app.get("/ask", Some("sessionToken=")).await;

    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_api_is_never_redirected() {
    let app = setup().await;

    let response = app.get("/api/questions", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.get("/api/unknown", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_assets_are_public() {
    let app = setup().await;

    let response = app.get("/static/app.js", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[header::CONTENT_TYPE], "text/javascript");
    assert!(response.text.contains("session-check"));

    let response = app.get("/static/missing.js", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pages_send_csp() {
    let app = setup().await;

    let response = app.get("/", None).await;

    assert!(
        response.headers[header::CONTENT_SECURITY_POLICY]
            .to_str()
            .unwrap()
            .contains("default-src 'self'")
    );
}
