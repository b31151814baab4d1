//! Account endpoints: register, login, signout and session-check.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header::SET_COOKIE},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::error::{ApiError, ResultExt};
use super::validation::{FieldErrors, char_len, is_valid_email};
use crate::auth::{OptionalAuth, clear_cookie, issue_cookie};
use crate::db::{CreateUserError, Database, NewUser, User};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::password::{hash_password, verify_password};

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub secure_cookies: bool,
    pub bcrypt_cost: u32,
}

impl_has_auth_backend!(UsersState);

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/signout", post(signout))
        .route("/session-check", get(session_check))
        .with_state(state)
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RegisterRequest {
    username: String,
    email: String,
    password: String,
    firstname: String,
    lastname: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        errors.check(
            char_len(self.username.trim()) >= 3,
            "username",
            "Username must be at least 3 characters",
        );
        errors.check(
            is_valid_email(self.email.trim()),
            "email",
            "Invalid email address",
        );
        errors.check(
            char_len(&self.password) >= 6,
            "password",
            "Password must be at least 6 characters",
        );
        errors.check(
            !self.firstname.trim().is_empty(),
            "firstname",
            "First name is required",
        );
        errors.check(
            !self.lastname.trim().is_empty(),
            "lastname",
            "Last name is required",
        );
        errors.into_result()
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct LoginRequest {
    email: String,
    password: String,
}

/// Public view of a user. Never carries the password hash.
#[derive(Serialize)]
struct UserResponse {
    userid: i64,
    username: String,
    email: String,
    firstname: String,
    lastname: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            userid: user.userid,
            username: user.username,
            email: user.email,
            firstname: user.firstname,
            lastname: user.lastname,
        }
    }
}

#[derive(Serialize)]
struct AccountResponse {
    message: &'static str,
    user: UserResponse,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionCheckResponse {
    logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
}

const TAKEN_MESSAGE: &str = "Username or email already taken";
const BAD_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

async fn register(
    State(state): State<UsersState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let username = payload.username.trim();
    let email = payload.email.trim();

    let taken = state
        .db
        .users()
        .is_taken(username, email)
        .await
        .db_err("Failed to check username availability")?;
    if taken {
        return Err(ApiError::bad_request(TAKEN_MESSAGE));
    }

    let password_hash = hash_password(&payload.password, state.bcrypt_cost)
        .await
        .db_err("Failed to hash password")?;

    // A concurrent registration can still win between the check and the insert
    let user = match state
        .db
        .users()
        .create(&NewUser {
            username,
            email,
            password_hash: &password_hash,
            firstname: payload.firstname.trim(),
            lastname: payload.lastname.trim(),
        })
        .await
    {
        Ok(user) => user,
        Err(CreateUserError::Taken) => return Err(ApiError::bad_request(TAKEN_MESSAGE)),
        Err(e) => return Err(ApiError::internal_error("Failed to create user", e)),
    };

    info!(user_id = user.userid, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            message: "User registered successfully",
            user: user.into(),
        }),
    ))
}

async fn login(
    State(state): State<UsersState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let email = payload.email.trim();

    let mut errors = FieldErrors::default();
    errors.check(is_valid_email(email), "email", "Invalid email");
    errors.check(!payload.password.is_empty(), "password", "Password is required");
    errors.into_result()?;

    let user = state
        .db
        .users()
        .get_by_email(email)
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::unauthorized(BAD_CREDENTIALS_MESSAGE))?;

    let matches = verify_password(&payload.password, &user.password_hash)
        .await
        .db_err("Failed to verify password")?;
    if !matches {
        info!(user_id = user.userid, "Login rejected: wrong password");
        return Err(ApiError::unauthorized(BAD_CREDENTIALS_MESSAGE));
    }

    let session = state
        .jwt
        .mint(user.userid, &user.username)
        .db_err("Failed to create session token")?;

    info!(user_id = user.userid, expires_at = session.expires_at, "User logged in");

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, issue_cookie(&session.token, state.secure_cookies))],
        Json(AccountResponse {
            message: "Login successful",
            user: user.into(),
        }),
    ))
}

/// Clears the cookie only. A copied token stays valid until it expires.
async fn signout(State(state): State<UsersState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(SET_COOKIE, clear_cookie(state.secure_cookies))],
        Json(MessageResponse {
            message: "Signed out successfully",
        }),
    )
}

async fn session_check(OptionalAuth(auth_user): OptionalAuth) -> impl IntoResponse {
    Json(SessionCheckResponse {
        logged_in: auth_user.is_some(),
        username: auth_user.map(|user| user.username),
    })
}
