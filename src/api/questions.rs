use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::error::{ApiError, ResultExt};
use super::validation::{FieldErrors, char_len};
use crate::auth::Auth;
use crate::db::{AnswerWithAuthor, Database, Question, QuestionWithAuthor};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;

const MAX_TITLE_CHARS: usize = 255;
const MAX_TAG_CHARS: usize = 50;

#[derive(Clone)]
pub struct QuestionsState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub secure_cookies: bool,
}

impl_has_auth_backend!(QuestionsState);

pub fn router(state: QuestionsState) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .route("/questions", get(list_questions))
        .route("/questions/{questionid}", get(get_question))
        .with_state(state)
}

/// Any `userid` in the body is ignored; the author comes from the session.
#[derive(Deserialize, Default)]
#[serde(default)]
struct AskRequest {
    title: String,
    description: String,
    tag: Option<String>,
}

impl AskRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let title = self.title.trim();
        let mut errors = FieldErrors::default();
        errors.check(!title.is_empty(), "title", "Title is required");
        errors.check(
            char_len(title) <= MAX_TITLE_CHARS,
            "title",
            "Title is too long",
        );
        errors.check(
            !self.description.trim().is_empty(),
            "description",
            "Description is required",
        );
        if let Some(tag) = self.tag() {
            errors.check(char_len(tag) <= MAX_TAG_CHARS, "tag", "Tag is too long");
        }
        errors.into_result()
    }

    /// Blank tags are stored as no tag.
    fn tag(&self) -> Option<&str> {
        self.tag.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

#[derive(Serialize)]
struct AskResponse {
    message: &'static str,
    question: Question,
}

#[derive(Serialize)]
struct QuestionDetailResponse {
    #[serde(flatten)]
    question: QuestionWithAuthor,
    answers: Vec<AnswerWithAuthor>,
}

async fn ask(
    State(state): State<QuestionsState>,
    Auth(user): Auth,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let question = state
        .db
        .questions()
        .create(
            user.user_id,
            payload.title.trim(),
            payload.description.trim(),
            payload.tag(),
        )
        .await
        .db_err("Failed to create question")?;

    info!(
        user_id = user.user_id,
        questionid = %question.questionid,
        "Question posted"
    );

    Ok((
        StatusCode::CREATED,
        Json(AskResponse {
            message: "Question posted successfully",
            question,
        }),
    ))
}

async fn list_questions(
    State(state): State<QuestionsState>,
) -> Result<impl IntoResponse, ApiError> {
    let questions = state
        .db
        .questions()
        .list()
        .await
        .db_err("Failed to list questions")?;

    Ok(Json(questions))
}

async fn get_question(
    State(state): State<QuestionsState>,
    Path(questionid): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let question = state
        .db
        .questions()
        .get_by_questionid(&questionid)
        .await
        .db_err("Failed to get question")?
        .ok_or_else(|| ApiError::not_found("Question not found"))?;

    let answers = state
        .db
        .answers()
        .list_for_question(&questionid)
        .await
        .db_err("Failed to list answers")?;

    Ok(Json(QuestionDetailResponse { question, answers }))
}
