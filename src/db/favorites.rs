use sqlx::sqlite::SqlitePool;

use super::sqlite::{from_millis, to_millis};
use super::subscription::{ChangeFeed, LiveQuery};
use crate::error::AppResult;
use crate::models::{Favorite, NewFavorite, ShowId, UserId};

/// Favorites with at most one row per (user, show)
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Inserts, replacing any existing row for the same (user, show)
    async fn upsert(&self, favorite: &NewFavorite) -> AppResult<()>;

    /// Removes the (user, show) row if present, returning whether one was removed
    async fn delete(&self, user_id: UserId, show_id: ShowId) -> AppResult<bool>;

    async fn exists(&self, user_id: UserId, show_id: ShowId) -> AppResult<bool>;

    /// Favorites of one user, most recently added first
    async fn list_by_user(&self, user_id: UserId) -> AppResult<Vec<Favorite>>;

    /// Favorites of every user, most recently added first
    async fn list_all(&self) -> AppResult<Vec<Favorite>>;

    /// Non-null genre strings of a user's favorites, oldest favorite first
    async fn genres_by_user(&self, user_id: UserId) -> AppResult<Vec<String>>;

    fn watch_by_user(&self, user_id: UserId) -> LiveQuery<Favorite>;

    fn watch_all(&self) -> LiveQuery<Favorite>;
}

#[derive(sqlx::FromRow)]
struct FavoriteRow {
    id: i64,
    user_id: i64,
    show_id: i64,
    show_name: String,
    image_url: Option<String>,
    genres: Option<String>,
    rating: Option<f64>,
    added_at: i64,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Favorite {
            id: row.id,
            user_id: row.user_id,
            show_id: row.show_id,
            show_name: row.show_name,
            image_url: row.image_url,
            genres: row.genres,
            rating: row.rating,
            added_at: from_millis(row.added_at),
        }
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, show_id, show_name, image_url, genres, rating, added_at FROM favorites";

async fn fetch_by_user(pool: &SqlitePool, user_id: UserId) -> AppResult<Vec<Favorite>> {
    let rows: Vec<FavoriteRow> = sqlx::query_as(&format!(
        "{} WHERE user_id = ? ORDER BY added_at DESC, id DESC",
        SELECT_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Favorite::from).collect())
}

async fn fetch_all(pool: &SqlitePool) -> AppResult<Vec<Favorite>> {
    let rows: Vec<FavoriteRow> = sqlx::query_as(&format!(
        "{} ORDER BY added_at DESC, id DESC",
        SELECT_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Favorite::from).collect())
}

/// SQLite-backed favorites
#[derive(Debug, Clone)]
pub struct SqliteFavoriteStore {
    pool: SqlitePool,
    changes: ChangeFeed,
}

impl SqliteFavoriteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            changes: ChangeFeed::new(),
        }
    }
}

#[async_trait::async_trait]
impl FavoriteStore for SqliteFavoriteStore {
    async fn upsert(&self, favorite: &NewFavorite) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO favorites
                (user_id, show_id, show_name, image_url, genres, rating, added_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(favorite.user_id)
        .bind(favorite.show_id)
        .bind(favorite.show_name.as_str())
        .bind(favorite.image_url.as_deref())
        .bind(favorite.genres.as_deref())
        .bind(favorite.rating)
        .bind(to_millis(favorite.added_at))
        .execute(&self.pool)
        .await?;

        self.changes.notify();
        Ok(())
    }

    async fn delete(&self, user_id: UserId, show_id: ShowId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND show_id = ?")
            .bind(user_id)
            .bind(show_id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            self.changes.notify();
        }
        Ok(removed)
    }

    async fn exists(&self, user_id: UserId, show_id: ShowId) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = ? AND show_id = ?)",
        )
        .bind(user_id)
        .bind(show_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list_by_user(&self, user_id: UserId) -> AppResult<Vec<Favorite>> {
        fetch_by_user(&self.pool, user_id).await
    }

    async fn list_all(&self) -> AppResult<Vec<Favorite>> {
        fetch_all(&self.pool).await
    }

    async fn genres_by_user(&self, user_id: UserId) -> AppResult<Vec<String>> {
        let genres: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT genres FROM favorites
            WHERE user_id = ? AND genres IS NOT NULL
            ORDER BY added_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(genres)
    }

    fn watch_by_user(&self, user_id: UserId) -> LiveQuery<Favorite> {
        let pool = self.pool.clone();
        LiveQuery::new(&self.changes, move || {
            let pool = pool.clone();
            async move { fetch_by_user(&pool, user_id).await }
        })
    }

    fn watch_all(&self) -> LiveQuery<Favorite> {
        let pool = self.pool.clone();
        LiveQuery::new(&self.changes, move || {
            let pool = pool.clone();
            async move { fetch_all(&pool).await }
        })
    }
}
