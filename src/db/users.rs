use sqlx::sqlite::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User, UserId};

/// Account storage. Credentials are compared as stored, without hashing.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user and reads it back; duplicate usernames are a `Conflict`
    async fn insert(&self, new_user: &NewUser) -> AppResult<User>;

    async fn find_by_credentials(&self, username: &str, password: &str)
        -> AppResult<Option<User>>;

    async fn get_by_id(&self, user_id: UserId) -> AppResult<Option<User>>;

    async fn list(&self) -> AppResult<Vec<User>>;
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
    is_admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password: row.password,
            is_admin: row.is_admin,
        }
    }
}

/// SQLite-backed accounts
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserStore for SqliteUserStore {
    async fn insert(&self, new_user: &NewUser) -> AppResult<User> {
        let result = sqlx::query("INSERT INTO users (username, password, is_admin) VALUES (?, ?, ?)")
            .bind(new_user.username.as_str())
            .bind(new_user.password.as_str())
            .bind(new_user.is_admin)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Conflict(
                    format!("Username '{}' is already taken", new_user.username),
                ),
                other => AppError::Database(other),
            })?;

        let user_id = result.last_insert_rowid();
        self.get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} missing after insert", user_id)))
    }

    async fn find_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, password, is_admin FROM users WHERE username = ? AND password = ?",
        )
        .bind(username)
        .bind(password)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn get_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, username, password, is_admin FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(User::from))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let rows: Vec<UserRow> =
            sqlx::query_as("SELECT id, username, password, is_admin FROM users ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}
