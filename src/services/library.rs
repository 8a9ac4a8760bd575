use std::sync::Arc;

use chrono::Utc;

use crate::{
    db::{FavoriteStore, LiveQuery, SearchHistoryStore},
    error::{AppError, AppResult},
    models::{Favorite, NewFavorite, SearchHistoryEntry, Show, ShowId, UserId},
};

/// Favorites and search history of users
#[derive(Clone)]
pub struct LibraryService {
    favorites: Arc<dyn FavoriteStore>,
    history: Arc<dyn SearchHistoryStore>,
}

impl LibraryService {
    pub fn new(favorites: Arc<dyn FavoriteStore>, history: Arc<dyn SearchHistoryStore>) -> Self {
        Self { favorites, history }
    }

    /// Saves a favorite with a copy of the show's current display data
    ///
    /// Favoriting the same show again replaces the earlier copy.
    pub async fn add_favorite(&self, user_id: UserId, show: &Show) -> AppResult<Favorite> {
        let favorite = NewFavorite::snapshot(user_id, show, Utc::now());
        self.favorites.upsert(&favorite).await?;

        tracing::info!(user_id, show_id = show.id, "Favorite added");

        self.favorites
            .list_by_user(user_id)
            .await?
            .into_iter()
            .find(|f| f.show_id == show.id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Favorite {} for user {} missing after insert",
                    show.id, user_id
                ))
            })
    }

    /// Removes a favorite; removing one that does not exist is not an error
    pub async fn remove_favorite(&self, user_id: UserId, show_id: ShowId) -> AppResult<()> {
        if self.favorites.delete(user_id, show_id).await? {
            tracing::info!(user_id, show_id, "Favorite removed");
        }
        Ok(())
    }

    pub async fn is_favorite(&self, user_id: UserId, show_id: ShowId) -> AppResult<bool> {
        self.favorites.exists(user_id, show_id).await
    }

    pub async fn favorites(&self, user_id: UserId) -> AppResult<Vec<Favorite>> {
        self.favorites.list_by_user(user_id).await
    }

    pub async fn all_favorites(&self) -> AppResult<Vec<Favorite>> {
        self.favorites.list_all().await
    }

    pub fn watch_favorites(&self, user_id: UserId) -> LiveQuery<Favorite> {
        self.favorites.watch_by_user(user_id)
    }

    pub fn watch_all_favorites(&self) -> LiveQuery<Favorite> {
        self.favorites.watch_all()
    }

    pub async fn history(&self, user_id: UserId) -> AppResult<Vec<SearchHistoryEntry>> {
        self.history.recent_by_user(user_id).await
    }

    pub async fn all_history(&self) -> AppResult<Vec<SearchHistoryEntry>> {
        self.history.list_all().await
    }

    pub fn watch_history(&self, user_id: UserId) -> LiveQuery<SearchHistoryEntry> {
        self.history.watch_by_user(user_id)
    }

    pub fn watch_all_history(&self) -> LiveQuery<SearchHistoryEntry> {
        self.history.watch_all()
    }

    pub async fn clear_history(&self, user_id: UserId) -> AppResult<u64> {
        let removed = self.history.clear_user(user_id).await?;
        tracing::info!(user_id, removed, "Search history cleared");
        Ok(removed)
    }
}
