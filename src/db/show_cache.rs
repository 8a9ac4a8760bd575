use chrono::{DateTime, Utc};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool};

use super::sqlite::{from_millis, to_millis};
use crate::error::AppResult;
use crate::models::{CachedShow, ShowId};

/// Upper bound on rows returned by a genre lookup
pub const GENRE_SEARCH_CAP: u32 = 10;

/// Local key-value store of catalog shows, keyed by show id
///
/// Writes replace any existing row with the same id. Lookups order by rating
/// descending with unrated shows last.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ShowCacheStore: Send + Sync {
    async fn upsert(&self, show: &CachedShow) -> AppResult<()>;

    /// Writes all shows in one transaction
    async fn upsert_many(&self, shows: &[CachedShow]) -> AppResult<()>;

    async fn get_by_id(&self, show_id: ShowId) -> AppResult<Option<CachedShow>>;

    /// Shows whose name contains `query` (case-sensitive)
    async fn search_by_name(&self, query: &str) -> AppResult<Vec<CachedShow>>;

    /// Shows whose stored genre string contains `genre` anywhere, at most
    /// `min(limit, GENRE_SEARCH_CAP)` rows
    async fn search_by_genre(&self, genre: &str, limit: u32) -> AppResult<Vec<CachedShow>>;

    /// Deletes rows cached before `cutoff`, returning how many were removed
    async fn evict_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}

#[derive(sqlx::FromRow)]
struct ShowCacheRow {
    show_id: i64,
    name: String,
    language: Option<String>,
    genres: Option<String>,
    status: Option<String>,
    premiered: Option<String>,
    rating: Option<f64>,
    image_url: Option<String>,
    summary: Option<String>,
    cached_at: i64,
}

impl From<ShowCacheRow> for CachedShow {
    fn from(row: ShowCacheRow) -> Self {
        CachedShow {
            show_id: row.show_id,
            name: row.name,
            language: row.language,
            genres: row.genres,
            status: row.status,
            premiered: row.premiered,
            rating: row.rating,
            image_url: row.image_url,
            summary: row.summary,
            cached_at: from_millis(row.cached_at),
        }
    }
}

const SELECT_COLUMNS: &str = "SELECT show_id, name, language, genres, status, premiered, rating, image_url, summary, cached_at FROM show_cache";

const RATING_ORDER: &str = "ORDER BY rating IS NULL, rating DESC, show_id ASC";

fn upsert_query(show: &CachedShow) -> Query<'_, Sqlite, SqliteArguments<'_>> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO show_cache
            (show_id, name, language, genres, status, premiered, rating, image_url, summary, cached_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(show.show_id)
    .bind(show.name.as_str())
    .bind(show.language.as_deref())
    .bind(show.genres.as_deref())
    .bind(show.status.as_deref())
    .bind(show.premiered.as_deref())
    .bind(show.rating)
    .bind(show.image_url.as_deref())
    .bind(show.summary.as_deref())
    .bind(to_millis(show.cached_at))
}

/// SQLite-backed show cache
#[derive(Debug, Clone)]
pub struct SqliteShowCache {
    pool: SqlitePool,
}

impl SqliteShowCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ShowCacheStore for SqliteShowCache {
    async fn upsert(&self, show: &CachedShow) -> AppResult<()> {
        upsert_query(show).execute(&self.pool).await?;
        Ok(())
    }

    async fn upsert_many(&self, shows: &[CachedShow]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        for show in shows {
            upsert_query(show).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        tracing::debug!(count = shows.len(), "Cached shows");
        Ok(())
    }

    async fn get_by_id(&self, show_id: ShowId) -> AppResult<Option<CachedShow>> {
        let row: Option<ShowCacheRow> =
            sqlx::query_as(&format!("{} WHERE show_id = ?", SELECT_COLUMNS))
                .bind(show_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(CachedShow::from))
    }

    async fn search_by_name(&self, query: &str) -> AppResult<Vec<CachedShow>> {
        let rows: Vec<ShowCacheRow> = sqlx::query_as(&format!(
            "{} WHERE instr(name, ?) > 0 {}",
            SELECT_COLUMNS, RATING_ORDER
        ))
        .bind(query)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CachedShow::from).collect())
    }

    async fn search_by_genre(&self, genre: &str, limit: u32) -> AppResult<Vec<CachedShow>> {
        let rows: Vec<ShowCacheRow> = sqlx::query_as(&format!(
            "{} WHERE genres IS NOT NULL AND instr(genres, ?) > 0 {} LIMIT ?",
            SELECT_COLUMNS, RATING_ORDER
        ))
        .bind(genre)
        .bind(i64::from(limit.min(GENRE_SEARCH_CAP)))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CachedShow::from).collect())
    }

    async fn evict_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM show_cache WHERE cached_at < ?")
            .bind(to_millis(cutoff))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
