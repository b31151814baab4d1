mod answers;
mod error;
mod questions;
mod users;
mod validation;

use axum::Router;
use std::sync::Arc;

use crate::db::Database;
use crate::jwt::JwtConfig;

/// Create the API router.
pub fn create_api_router(
    db: Database,
    jwt: Arc<JwtConfig>,
    secure_cookies: bool,
    bcrypt_cost: u32,
) -> Router {
    let users_state = users::UsersState {
        db: db.clone(),
        jwt: jwt.clone(),
        secure_cookies,
        bcrypt_cost,
    };

    let questions_state = questions::QuestionsState {
        db: db.clone(),
        jwt: jwt.clone(),
        secure_cookies,
    };

    let answers_state = answers::AnswersState {
        db,
        jwt,
        secure_cookies,
    };

    Router::new()
        .merge(users::router(users_state))
        .merge(questions::router(questions_state))
        .merge(answers::router(answers_state))
}
