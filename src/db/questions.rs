//! Question storage.

use serde::Serialize;
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct QuestionStore {
    pool: SqlitePool,
}

/// A stored question.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    /// Public identifier used in URLs
    pub questionid: String,
    pub userid: i64,
    pub title: String,
    pub description: String,
    pub tag: Option<String>,
    pub created_at: String,
}

/// A question joined with its author's username.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct QuestionWithAuthor {
    pub id: i64,
    pub questionid: String,
    pub userid: i64,
    pub username: String,
    pub title: String,
    pub description: String,
    pub tag: Option<String>,
    pub created_at: String,
}

impl QuestionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new question owned by `userid`.
    pub async fn create(
        &self,
        userid: i64,
        title: &str,
        description: &str,
        tag: Option<&str>,
    ) -> Result<Question, sqlx::Error> {
        let questionid = uuid::Uuid::new_v4().to_string();

        let result = sqlx::query(
            "INSERT INTO questions (questionid, userid, title, description, tag) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&questionid)
        .bind(userid)
        .bind(title)
        .bind(description)
        .bind(tag)
        .execute(&self.pool)
        .await?;

        sqlx::query_as(
            "SELECT id, questionid, userid, title, description, tag, created_at FROM questions WHERE id = ?",
        )
        .bind(result.last_insert_rowid())
        .fetch_one(&self.pool)
        .await
    }

    /// List all questions with their author, newest first.
    pub async fn list(&self) -> Result<Vec<QuestionWithAuthor>, sqlx::Error> {
        sqlx::query_as(
            "SELECT q.id, q.questionid, q.userid, u.username, q.title, q.description, q.tag, q.created_at
             FROM questions q JOIN users u ON u.userid = q.userid
             ORDER BY q.id DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Get a question by its public identifier.
    pub async fn get_by_questionid(
        &self,
        questionid: &str,
    ) -> Result<Option<QuestionWithAuthor>, sqlx::Error> {
        sqlx::query_as(
            "SELECT q.id, q.questionid, q.userid, u.username, q.title, q.description, q.tag, q.created_at
             FROM questions q JOIN users u ON u.userid = q.userid
             WHERE q.questionid = ?",
        )
        .bind(questionid)
        .fetch_optional(&self.pool)
        .await
    }

    /// Check whether a question exists.
    pub async fn exists(&self, questionid: &str) -> Result<bool, sqlx::Error> {
        let count: (i32,) = sqlx::query_as("SELECT COUNT(*) FROM questions WHERE questionid = ?")
            .bind(questionid)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0 > 0)
    }
}
