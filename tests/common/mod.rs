#![allow(dead_code)]

use askboard::{ServerConfig, create_app, db::Database, jwt::JwtConfig};
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"test-jwt-secret-that-is-long-enough";

/// Lowest cost bcrypt accepts, keeps registration fast in tests.
const TEST_BCRYPT_COST: u32 = 4;

pub struct TestApp {
    pub app: Router,
    pub db: Database,
    /// Codec sharing the app's secret, for minting tokens by hand
    pub jwt: JwtConfig,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub text: String,
}

impl TestResponse {
    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

pub async fn setup() -> TestApp {
    setup_with_secure_cookies(false).await
}

pub async fn setup_with_secure_cookies(secure_cookies: bool) -> TestApp {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        jwt_secret: TEST_SECRET.to_vec(),
        secure_cookies,
        bcrypt_cost: TEST_BCRYPT_COST,
    };
    let app = create_app(&config).expect("Failed to create app");
    let jwt = JwtConfig::new(TEST_SECRET).expect("Failed to create JWT config");

    TestApp { app, db, jwt }
}

pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Turn a `Set-Cookie` value into the `Cookie` header a browser would send.
pub fn cookie_header(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().trim().to_string()
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Body>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                body
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        let text = String::from_utf8_lossy(&bytes).into_owned();

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request("GET", uri, None, cookie).await
    }

    pub async fn post(&self, uri: &str, body: Value, cookie: Option<&str>) -> TestResponse {
        self.request("POST", uri, Some(Body::from(body.to_string())), cookie)
            .await
    }

    /// Register `username` with email `<username>@example.com` and password `password123`.
    pub async fn register(&self, username: &str) -> TestResponse {
        self.post(
            "/api/register",
            json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "password123",
                "firstname": "Test",
                "lastname": "User",
            }),
            None,
        )
        .await
    }

    /// Register and log in, returning the `Cookie` header for the session.
    pub async fn register_and_login(&self, username: &str) -> String {
        let response = self.register(username).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        let response = self
            .post(
                "/api/login",
                json!({
                    "email": format!("{}@example.com", username),
                    "password": "password123",
                }),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);

        cookie_header(response.set_cookie().expect("login sets a cookie"))
    }

    pub async fn ask(&self, cookie: &str, title: &str) -> TestResponse {
        self.post(
            "/api/ask",
            json!({"title": title, "description": "details"}),
            Some(cookie),
        )
        .await
    }
}
