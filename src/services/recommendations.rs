use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    db::{show_cache::GENRE_SEARCH_CAP, FavoriteStore, ShowCacheStore},
    error::AppResult,
    models::{genres::genre_tokens, Show, UserId},
    services::catalog::CatalogClient,
};

/// Maximum number of recommendations returned
pub const MAX_RECOMMENDATIONS: usize = 10;

/// How many of the user's most frequent genres drive candidate lookup
pub const TOP_GENRE_COUNT: usize = 3;

/// Ranks genres by how many favorites carry them, most frequent first
///
/// Each favorite contributes at most one count per genre. Ties keep first-seen
/// order across `favorite_genres`, then left to right within a genre string.
pub fn rank_genres<S: AsRef<str>>(favorite_genres: &[S]) -> Vec<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for encoded in favorite_genres {
        let mut seen_here = HashSet::new();
        for token in genre_tokens(encoded.as_ref()) {
            if !seen_here.insert(token) {
                continue;
            }
            let count = counts.entry(token).or_insert_with(|| {
                order.push(token);
                0
            });
            *count += 1;
        }
    }

    // Stable sort keeps first-seen order for equal counts
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.into_iter().map(str::to_string).collect()
}

/// Genre-based recommendations derived from a user's favorites
#[derive(Clone)]
pub struct RecommendationService {
    catalog: Arc<dyn CatalogClient>,
    cache: Arc<dyn ShowCacheStore>,
    favorites: Arc<dyn FavoriteStore>,
}

impl RecommendationService {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        cache: Arc<dyn ShowCacheStore>,
        favorites: Arc<dyn FavoriteStore>,
    ) -> Self {
        Self {
            catalog,
            cache,
            favorites,
        }
    }

    /// Up to `MAX_RECOMMENDATIONS` shows matching the user's top genres
    ///
    /// 1. Rank the genres of the user's favorites and keep the top three
    /// 2. With no genre data, return the first page of the catalog (cold start)
    /// 3. Otherwise collect cached shows per genre, in genre rank order
    /// 4. If the cache had nothing, search the catalog for the top genre only
    /// 5. Drop repeated show ids (first occurrence wins) and truncate
    ///
    /// Any store or catalog error fails the whole call.
    #[tracing::instrument(skip(self))]
    pub async fn recommendations_for(&self, user_id: UserId) -> AppResult<Vec<Show>> {
        let favorite_genres = self.favorites.genres_by_user(user_id).await?;
        let top_genres: Vec<String> = rank_genres(&favorite_genres)
            .into_iter()
            .take(TOP_GENRE_COUNT)
            .collect();

        if top_genres.is_empty() {
            tracing::info!(user_id, "No favorite genres, using catalog cold start");
            let mut shows = self.catalog.list_page(0).await?;
            shows.truncate(MAX_RECOMMENDATIONS);
            return Ok(shows);
        }

        tracing::debug!(user_id, genres = ?top_genres, "Top favorite genres");

        let mut candidates: Vec<Show> = Vec::new();
        for genre in &top_genres {
            let cached = self.cache.search_by_genre(genre, GENRE_SEARCH_CAP).await?;
            candidates.extend(cached.into_iter().map(Show::from));
        }

        if candidates.is_empty() {
            let genre = &top_genres[0];
            tracing::info!(
                user_id,
                genre = %genre,
                provider = self.catalog.name(),
                "Cache has no shows for top genres, searching catalog"
            );
            candidates = self
                .catalog
                .search(genre)
                .await?
                .into_iter()
                .map(|r| r.show)
                .collect();
        }

        let mut seen = HashSet::new();
        let recommendations: Vec<Show> = candidates
            .into_iter()
            .filter(|show| seen.insert(show.id))
            .take(MAX_RECOMMENDATIONS)
            .collect();

        tracing::info!(
            user_id,
            results = recommendations.len(),
            "Recommendations generated"
        );

        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::favorites::MockFavoriteStore;
    use crate::db::show_cache::MockShowCacheStore;
    use crate::error::AppError;
    use crate::models::{CachedShow, ShowId, ShowSearchResult};
    use crate::services::catalog::MockCatalogClient;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn show(id: ShowId, name: &str) -> Show {
        Show {
            id,
            name: name.to_string(),
            language: None,
            genres: None,
            status: None,
            premiered: None,
            rating: None,
            image: None,
            summary: None,
        }
    }

    fn cached(id: ShowId, name: &str, genres: &str) -> CachedShow {
        CachedShow {
            show_id: id,
            name: name.to_string(),
            language: None,
            genres: Some(genres.to_string()),
            status: None,
            premiered: None,
            rating: None,
            image_url: None,
            summary: None,
            cached_at: Utc::now(),
        }
    }

    fn favorites_with(genres: &[&str]) -> MockFavoriteStore {
        let genres: Vec<String> = genres.iter().map(|g| g.to_string()).collect();
        let mut favorites = MockFavoriteStore::new();
        favorites
            .expect_genres_by_user()
            .returning(move |_| Ok(genres.clone()));
        favorites
    }

    fn service(
        catalog: MockCatalogClient,
        cache: MockShowCacheStore,
        favorites: MockFavoriteStore,
    ) -> RecommendationService {
        RecommendationService::new(Arc::new(catalog), Arc::new(cache), Arc::new(favorites))
    }

    fn ids(shows: &[Show]) -> Vec<ShowId> {
        shows.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_rank_genres_counts_favorites() {
        let ranked = rank_genres(&["Drama,Thriller", "Drama", "Comedy"]);
        assert_eq!(ranked, vec!["Drama", "Thriller", "Comedy"]);
    }

    #[test]
    fn test_rank_genres_ties_keep_first_seen_order() {
        let ranked = rank_genres(&["Comedy,Horror", "Horror,Action", "Action,Comedy"]);
        assert_eq!(ranked, vec!["Comedy", "Horror", "Action"]);
    }

    #[test]
    fn test_rank_genres_trims_and_counts_once_per_favorite() {
        let ranked = rank_genres(&["Drama, Drama ,Crime", " Crime", "Crime,"]);
        assert_eq!(ranked, vec!["Crime", "Drama"]);
    }

    #[test]
    fn test_rank_genres_empty() {
        let none: [&str; 0] = [];
        assert!(rank_genres(&none).is_empty());
        assert!(rank_genres(&["", " , "]).is_empty());
    }

    #[tokio::test]
    async fn test_cold_start_uses_first_catalog_page_and_skips_cache() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_list_page()
            .with(eq(0))
            .times(1)
            .returning(|_| Ok((1..=25).map(|id| show(id, "Popular")).collect()));
        let mut cache = MockShowCacheStore::new();
        cache.expect_search_by_genre().never();

        let shows = service(catalog, cache, favorites_with(&[]))
            .recommendations_for(1)
            .await
            .unwrap();

        assert_eq!(ids(&shows), (1..=10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_cold_start_failure_is_hard_failure() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_list_page()
            .returning(|_| Err(AppError::ExternalApi("down".to_string())));

        let err = service(catalog, MockShowCacheStore::new(), favorites_with(&[]))
            .recommendations_for(1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
    }

    #[tokio::test]
    async fn test_candidates_follow_genre_rank_and_are_deduplicated() {
        let mut cache = MockShowCacheStore::new();
        let mut seq = mockall::Sequence::new();
        cache
            .expect_search_by_genre()
            .withf(|genre, limit| genre == "Drama" && *limit == GENRE_SEARCH_CAP)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Ok(vec![
                    cached(10, "Fargo", "Drama,Crime"),
                    cached(11, "Dark", "Drama,Thriller"),
                ])
            });
        cache
            .expect_search_by_genre()
            .withf(|genre, _| genre == "Thriller")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Ok(vec![
                    cached(11, "Dark", "Drama,Thriller"),
                    cached(12, "Mindhunter", "Thriller"),
                ])
            });
        cache
            .expect_search_by_genre()
            .withf(|genre, _| genre == "Comedy")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(vec![cached(13, "Friends", "Comedy")]));
        let mut catalog = MockCatalogClient::new();
        catalog.expect_search().never();

        let shows = service(
            catalog,
            cache,
            favorites_with(&["Drama,Thriller", "Drama", "Comedy"]),
        )
        .recommendations_for(1)
        .await
        .unwrap();

        assert_eq!(ids(&shows), vec![10, 11, 12, 13]);
    }

    #[tokio::test]
    async fn test_result_is_capped() {
        let mut cache = MockShowCacheStore::new();
        cache.expect_search_by_genre().returning(|genre, _| {
            let base = if genre == "Drama" { 100 } else { 200 };
            Ok((0..10)
                .map(|i| cached(base + i, "Show", genre))
                .collect())
        });

        let shows = service(
            MockCatalogClient::new(),
            cache,
            favorites_with(&["Drama,Crime"]),
        )
        .recommendations_for(1)
        .await
        .unwrap();

        assert_eq!(shows.len(), MAX_RECOMMENDATIONS);
        assert!(shows.iter().all(|s| s.id < 200));
    }

    #[tokio::test]
    async fn test_empty_cache_escalates_to_top_genre_search_only() {
        let mut cache = MockShowCacheStore::new();
        cache
            .expect_search_by_genre()
            .times(2)
            .returning(|_, _| Ok(vec![]));
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_search()
            .withf(|query| query == "Drama")
            .times(1)
            .returning(|_| {
                Ok(vec![
                    ShowSearchResult {
                        score: 0.8,
                        show: show(5, "Drama Club"),
                    },
                    ShowSearchResult {
                        score: 0.7,
                        show: show(5, "Drama Club"),
                    },
                    ShowSearchResult {
                        score: 0.6,
                        show: show(6, "Drama Queens"),
                    },
                ])
            });
        catalog.expect_name().return_const("mock");

        let shows = service(catalog, cache, favorites_with(&["Drama,Crime", "Drama"]))
            .recommendations_for(1)
            .await
            .unwrap();

        assert_eq!(ids(&shows), vec![5, 6]);
    }

    #[tokio::test]
    async fn test_escalation_failure_fails_operation() {
        let mut cache = MockShowCacheStore::new();
        cache.expect_search_by_genre().returning(|_, _| Ok(vec![]));
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_search()
            .returning(|_| Err(AppError::ExternalApi("down".to_string())));
        catalog.expect_name().return_const("mock");

        let result = service(catalog, cache, favorites_with(&["Drama"]))
            .recommendations_for(1)
            .await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced() {
        let mut favorites = MockFavoriteStore::new();
        favorites
            .expect_genres_by_user()
            .returning(|_| Err(AppError::Internal("disk full".to_string())));

        let result = service(MockCatalogClient::new(), MockShowCacheStore::new(), favorites)
            .recommendations_for(1)
            .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
