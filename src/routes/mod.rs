use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::{
        ShowCacheStore, SqliteFavoriteStore, SqliteHistoryStore, SqliteShowCache,
        SqliteUserStore,
    },
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{
        AccountService, CatalogClient, LibraryService, RecommendationService, ShowSearchService,
    },
};

pub mod cache;
pub mod favorites;
pub mod history;
mod events;
pub mod shows;
pub mod users;

/// Services shared by all handlers
pub struct AppState {
    pub search: ShowSearchService,
    pub recommendations: RecommendationService,
    pub library: LibraryService,
    pub accounts: AccountService,
    pub cache: Arc<dyn ShowCacheStore>,
    /// Default age for manual cache eviction
    pub cache_max_age: chrono::Duration,
}

impl AppState {
    /// Wires the SQLite-backed stores around one pool
    pub fn new(
        pool: SqlitePool,
        catalog: Arc<dyn CatalogClient>,
        cache_max_age: chrono::Duration,
    ) -> Self {
        let cache: Arc<dyn ShowCacheStore> = Arc::new(SqliteShowCache::new(pool.clone()));
        let favorites = Arc::new(SqliteFavoriteStore::new(pool.clone()));
        let history = Arc::new(SqliteHistoryStore::new(pool.clone()));
        let users = Arc::new(SqliteUserStore::new(pool));

        Self {
            search: ShowSearchService::new(catalog.clone(), cache.clone(), history.clone()),
            recommendations: RecommendationService::new(
                catalog,
                cache.clone(),
                favorites.clone(),
            ),
            library: LibraryService::new(favorites, history),
            accounts: AccountService::new(users),
            cache,
            cache_max_age,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(users::list).post(users::register))
        .route("/sessions", post(users::login))
        .route("/shows/:show_id", get(shows::get_show))
        .route("/users/:user_id/search", get(shows::search))
        .route(
            "/users/:user_id/recommendations",
            get(shows::recommendations),
        )
        .route(
            "/users/:user_id/favorites",
            get(favorites::list).post(favorites::add),
        )
        .route("/users/:user_id/favorites/live", get(favorites::live))
        .route(
            "/users/:user_id/favorites/:show_id",
            get(favorites::status).delete(favorites::remove),
        )
        .route(
            "/users/:user_id/history",
            get(history::list).delete(history::clear),
        )
        .route("/users/:user_id/history/live", get(history::live))
        .route("/favorites", get(favorites::list_all))
        .route("/favorites/live", get(favorites::live_all))
        .route("/history", get(history::list_all))
        .route("/history/live", get(history::live_all))
        .route("/cache/evict", post(cache::evict))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
