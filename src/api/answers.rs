use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::error::{ApiError, ResultExt};
use super::validation::FieldErrors;
use crate::auth::Auth;
use crate::db::{Answer, Database};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct AnswersState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub secure_cookies: bool,
}

impl_has_auth_backend!(AnswersState);

pub fn router(state: AnswersState) -> Router {
    Router::new()
        .route("/answer", post(answer))
        .with_state(state)
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct AnswerRequest {
    questionid: String,
    answer: String,
}

#[derive(Serialize)]
struct AnswerResponse {
    message: &'static str,
    answer: Answer,
}

async fn answer(
    State(state): State<AnswersState>,
    Auth(user): Auth,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let questionid = payload.questionid.trim();
    let text = payload.answer.trim();

    let mut errors = FieldErrors::default();
    errors.check(!questionid.is_empty(), "questionid", "Question ID is required.");
    errors.check(!text.is_empty(), "answer", "Answer is required");
    errors.into_result()?;

    let exists = state
        .db
        .questions()
        .exists(questionid)
        .await
        .db_err("Failed to check question")?;
    if !exists {
        return Err(ApiError::not_found("Question not found"));
    }

    let answer = state
        .db
        .answers()
        .create(user.user_id, questionid, text)
        .await
        .db_err("Failed to create answer")?;

    info!(
        user_id = user.user_id,
        questionid = %answer.questionid,
        answerid = answer.answerid,
        "Answer posted"
    );

    Ok((
        StatusCode::CREATED,
        Json(AnswerResponse {
            message: "Answer posted successfully",
            answer,
        }),
    ))
}
