//! Answer storage.

use serde::Serialize;
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct AnswerStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Answer {
    pub answerid: i64,
    pub questionid: String,
    pub userid: i64,
    pub answer: String,
    pub created_at: String,
}

/// An answer joined with its author's username.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AnswerWithAuthor {
    pub answerid: i64,
    pub questionid: String,
    pub userid: i64,
    pub username: String,
    pub answer: String,
    pub created_at: String,
}

impl AnswerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an answer to `questionid` owned by `userid`.
    pub async fn create(
        &self,
        userid: i64,
        questionid: &str,
        answer: &str,
    ) -> Result<Answer, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO answers (questionid, userid, answer) VALUES (?, ?, ?)")
                .bind(questionid)
                .bind(userid)
                .bind(answer)
                .execute(&self.pool)
                .await?;

        sqlx::query_as(
            "SELECT answerid, questionid, userid, answer, created_at FROM answers WHERE answerid = ?",
        )
        .bind(result.last_insert_rowid())
        .fetch_one(&self.pool)
        .await
    }

    /// List answers to a question with their authors, oldest first.
    pub async fn list_for_question(
        &self,
        questionid: &str,
    ) -> Result<Vec<AnswerWithAuthor>, sqlx::Error> {
        sqlx::query_as(
            "SELECT a.answerid, a.questionid, a.userid, u.username, a.answer, a.created_at
             FROM answers a JOIN users u ON u.userid = a.userid
             WHERE a.questionid = ?
             ORDER BY a.answerid",
        )
        .bind(questionid)
        .fetch_all(&self.pool)
        .await
    }
}
