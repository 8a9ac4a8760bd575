use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;

use super::sqlite::{from_millis, to_millis};
use super::subscription::{ChangeFeed, LiveQuery};
use crate::error::AppResult;
use crate::models::{SearchHistoryEntry, UserId};

/// How many entries the per-user history view keeps
pub const RECENT_HISTORY_LIMIT: i64 = 20;

/// Append-only log of search terms, no deduplication
#[async_trait::async_trait]
pub trait SearchHistoryStore: Send + Sync {
    async fn append(&self, user_id: UserId, query: &str, at: DateTime<Utc>) -> AppResult<()>;

    /// The newest `RECENT_HISTORY_LIMIT` entries of a user, newest first
    async fn recent_by_user(&self, user_id: UserId) -> AppResult<Vec<SearchHistoryEntry>>;

    async fn list_all(&self) -> AppResult<Vec<SearchHistoryEntry>>;

    /// Deletes every entry of a user, returning how many were removed
    async fn clear_user(&self, user_id: UserId) -> AppResult<u64>;

    fn watch_by_user(&self, user_id: UserId) -> LiveQuery<SearchHistoryEntry>;

    fn watch_all(&self) -> LiveQuery<SearchHistoryEntry>;
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: i64,
    user_id: i64,
    query: String,
    timestamp: i64,
}

impl From<HistoryRow> for SearchHistoryEntry {
    fn from(row: HistoryRow) -> Self {
        SearchHistoryEntry {
            id: row.id,
            user_id: row.user_id,
            query: row.query,
            timestamp: from_millis(row.timestamp),
        }
    }
}

async fn fetch_recent(pool: &SqlitePool, user_id: UserId) -> AppResult<Vec<SearchHistoryEntry>> {
    let rows: Vec<HistoryRow> = sqlx::query_as(
        r#"
        SELECT id, user_id, query, timestamp FROM search_history
        WHERE user_id = ?
        ORDER BY timestamp DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(RECENT_HISTORY_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(SearchHistoryEntry::from).collect())
}

async fn fetch_all(pool: &SqlitePool) -> AppResult<Vec<SearchHistoryEntry>> {
    let rows: Vec<HistoryRow> = sqlx::query_as(
        "SELECT id, user_id, query, timestamp FROM search_history ORDER BY timestamp DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(SearchHistoryEntry::from).collect())
}

/// SQLite-backed search history
#[derive(Debug, Clone)]
pub struct SqliteHistoryStore {
    pool: SqlitePool,
    changes: ChangeFeed,
}

impl SqliteHistoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            changes: ChangeFeed::new(),
        }
    }
}

#[async_trait::async_trait]
impl SearchHistoryStore for SqliteHistoryStore {
    async fn append(&self, user_id: UserId, query: &str, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("INSERT INTO search_history (user_id, query, timestamp) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(query)
            .bind(to_millis(at))
            .execute(&self.pool)
            .await?;

        self.changes.notify();
        Ok(())
    }

    async fn recent_by_user(&self, user_id: UserId) -> AppResult<Vec<SearchHistoryEntry>> {
        fetch_recent(&self.pool, user_id).await
    }

    async fn list_all(&self) -> AppResult<Vec<SearchHistoryEntry>> {
        fetch_all(&self.pool).await
    }

    async fn clear_user(&self, user_id: UserId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM search_history WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected();
        if removed > 0 {
            self.changes.notify();
        }
        Ok(removed)
    }

    fn watch_by_user(&self, user_id: UserId) -> LiveQuery<SearchHistoryEntry> {
        let pool = self.pool.clone();
        LiveQuery::new(&self.changes, move || {
            let pool = pool.clone();
            async move { fetch_recent(&pool, user_id).await }
        })
    }

    fn watch_all(&self) -> LiveQuery<SearchHistoryEntry> {
        let pool = self.pool.clone();
        LiveQuery::new(&self.changes, move || {
            let pool = pool.clone();
            async move { fetch_all(&pool).await }
        })
    }
}
