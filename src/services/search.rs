use std::sync::Arc;

use chrono::Utc;

use crate::{
    db::{SearchHistoryStore, ShowCacheStore},
    error::AppResult,
    models::{CachedShow, Show, ShowId, UserId},
    services::catalog::CatalogClient,
};

/// Show retrieval with local-cache fallback
///
/// Searches go to the remote catalog first. Successful results refresh the show
/// cache; when the catalog is unreachable, the cache answers instead.
#[derive(Clone)]
pub struct ShowSearchService {
    catalog: Arc<dyn CatalogClient>,
    cache: Arc<dyn ShowCacheStore>,
    history: Arc<dyn SearchHistoryStore>,
}

impl ShowSearchService {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        cache: Arc<dyn ShowCacheStore>,
        history: Arc<dyn SearchHistoryStore>,
    ) -> Self {
        Self {
            catalog,
            cache,
            history,
        }
    }

    /// Searches the catalog by text on behalf of `user_id`
    ///
    /// The query is recorded in the user's history before the catalog is called,
    /// so failed searches are recorded too. An empty remote result is a successful
    /// answer. When the catalog fails, cached shows whose name contains the query
    /// are returned, best rated first; if there are none, the catalog error is returned.
    #[tracing::instrument(skip(self))]
    pub async fn search_shows(&self, query: &str, user_id: UserId) -> AppResult<Vec<Show>> {
        self.history.append(user_id, query, Utc::now()).await?;

        let remote_error = match self.catalog.search(query).await {
            Ok(results) => {
                let shows: Vec<Show> = results.into_iter().map(|r| r.show).collect();
                self.refresh_cache(&shows).await?;
                return Ok(shows);
            }
            Err(e) => e,
        };

        tracing::warn!(
            error = %remote_error,
            remote = remote_error.is_remote(),
            provider = self.catalog.name(),
            "Catalog search failed, falling back to cache"
        );

        let cached = self.cache.search_by_name(query).await?;
        if cached.is_empty() {
            tracing::info!(query = %query, "No cached shows for failed search");
            return Err(remote_error);
        }

        tracing::info!(query = %query, results = cached.len(), "Serving search from cache");
        Ok(cached.into_iter().map(Show::from).collect())
    }

    /// Fetches one show, refreshing its cache row, or serves the cached row when
    /// the catalog fails
    #[tracing::instrument(skip(self))]
    pub async fn get_show(&self, show_id: ShowId) -> AppResult<Show> {
        match self.catalog.fetch_by_id(show_id).await {
            Ok(show) => {
                self.cache
                    .upsert(&CachedShow::from_show(&show, Utc::now()))
                    .await?;
                Ok(show)
            }
            Err(remote_error) => match self.cache.get_by_id(show_id).await? {
                Some(cached) => {
                    tracing::warn!(
                        error = %remote_error,
                        remote = remote_error.is_remote(),
                        "Catalog lookup failed, serving cached show"
                    );
                    Ok(cached.into())
                }
                None => Err(remote_error),
            },
        }
    }

    async fn refresh_cache(&self, shows: &[Show]) -> AppResult<()> {
        if shows.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let rows: Vec<CachedShow> = shows
            .iter()
            .map(|show| CachedShow::from_show(show, now))
            .collect();
        self.cache.upsert_many(&rows).await
    }
}
