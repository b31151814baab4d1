use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub userid: i64,
    pub username: String,
    pub email: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    pub created_at: String,
}

/// Fields required to register a user. The password must already be hashed.
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub firstname: &'a str,
    pub lastname: &'a str,
}

#[derive(Debug)]
pub enum CreateUserError {
    /// Username or email collides with an existing user
    Taken,
    Database(sqlx::Error),
}

impl std::fmt::Display for CreateUserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreateUserError::Taken => write!(f, "Username or email already taken"),
            CreateUserError::Database(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CreateUserError {}

impl From<sqlx::Error> for CreateUserError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                CreateUserError::Taken
            }
            _ => CreateUserError::Database(e),
        }
    }
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user and return the stored row.
    /// A unique-constraint violation (including a lost race with a concurrent
    /// registration) is reported as `CreateUserError::Taken`.
    pub async fn create(&self, user: &NewUser<'_>) -> Result<User, CreateUserError> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password, firstname, lastname) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.firstname)
        .bind(user.lastname)
        .execute(&self.pool)
        .await?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or(CreateUserError::Database(sqlx::Error::RowNotFound))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, userid: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(
            "SELECT userid, username, email, password, firstname, lastname, created_at FROM users WHERE userid = ?",
        )
        .bind(userid)
        .fetch_optional(&self.pool)
        .await
    }

    /// Get a user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(
            "SELECT userid, username, email, password, firstname, lastname, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// Get a user by username (case-insensitive).
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(
            "SELECT userid, username, email, password, firstname, lastname, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    /// Check whether either the username or the email is already registered.
    pub async fn is_taken(&self, username: &str, email: &str) -> Result<bool, sqlx::Error> {
        let count: (i32,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ? OR email = ?")
                .bind(username)
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0 > 0)
    }

    /// Delete a user by ID.
    pub async fn delete(&self, userid: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE userid = ?")
            .bind(userid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    use super::*;

    fn new_user<'a>(username: &'a str, email: &'a str) -> NewUser<'a> {
        NewUser {
            username,
            email,
            password_hash: "hash",
            firstname: "First",
            lastname: "Last",
        }
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = Database::open(":memory:").await.unwrap();

        let user = db.users().create(&new_user("alice", "a@x.com")).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.password_hash, "hash");

        let by_email = db.users().get_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.userid, user.userid);

        let by_id = db.users().get_by_id(user.userid).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");

        let by_name = db.users().get_by_username("ALICE").await.unwrap().unwrap();
        assert_eq!(by_name.userid, user.userid);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_taken() {
        let db = Database::open(":memory:").await.unwrap();

        db.users().create(&new_user("alice", "a@x.com")).await.unwrap();
        let result = db.users().create(&new_user("bob", "A@X.com")).await;

        assert!(matches!(result, Err(CreateUserError::Taken)));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_taken() {
        let db = Database::open(":memory:").await.unwrap();

        db.users().create(&new_user("alice", "a@x.com")).await.unwrap();
        let result = db.users().create(&new_user("alice", "b@x.com")).await;

        assert!(matches!(result, Err(CreateUserError::Taken)));
    }

    #[tokio::test]
    async fn test_is_taken() {
        let db = Database::open(":memory:").await.unwrap();

        assert!(!db.users().is_taken("alice", "a@x.com").await.unwrap());

        db.users().create(&new_user("alice", "a@x.com")).await.unwrap();
        assert!(db.users().is_taken("alice", "other@x.com").await.unwrap());
        assert!(db.users().is_taken("other", "a@x.com").await.unwrap());
        assert!(!db.users().is_taken("other", "other@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = Database::open(":memory:").await.unwrap();

        let user = db.users().create(&new_user("alice", "a@x.com")).await.unwrap();
        assert!(db.users().delete(user.userid).await.unwrap());
        assert!(db.users().get_by_id(user.userid).await.unwrap().is_none());
        assert!(!db.users().delete(user.userid).await.unwrap());
    }
}
