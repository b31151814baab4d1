pub mod api;
pub mod assets;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod password;

use api::create_api_router;
use auth::{RouteGuard, route_guard};
use axum::{Router, http::StatusCode, middleware};
use db::Database;
use jwt::{JwtConfig, JwtError};
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing session tokens
    pub jwt_secret: Vec<u8>,
    /// Whether to set Secure flag on cookies (should be true in production with HTTPS)
    pub secure_cookies: bool,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
}

/// Create the application router with the given configuration.
///
/// The route guard wraps every route, including the 404 fallback, so a
/// path nobody listed as public always requires a session cookie.
pub fn create_app(config: &ServerConfig) -> Result<Router, JwtError> {
    let jwt = Arc::new(JwtConfig::new(&config.jwt_secret)?);

    let api_router = create_api_router(
        config.db.clone(),
        jwt,
        config.secure_cookies,
        config.bcrypt_cost,
    );

    let guard = Arc::new(RouteGuard::default());

    Ok(Router::new()
        .nest("/api", api_router)
        .merge(assets::router())
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(middleware::from_fn_with_state(guard, route_guard)))
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(app: Router, listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}
