use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{Show, ShowId, UserId},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// Handler for show search; records the query in the user's history
pub async fn search(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<UserId>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<Show>>> {
    tracing::info!(request_id = %request_id, user_id, query = %params.q, "Searching shows");

    let shows = state.search.search_shows(&params.q, user_id).await?;

    tracing::info!(request_id = %request_id, count = shows.len(), "Search completed");
    Ok(Json(shows))
}

pub async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(show_id): Path<ShowId>,
) -> AppResult<Json<Show>> {
    Ok(Json(state.search.get_show(show_id).await?))
}

/// Handler for genre-based recommendations
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<Show>>> {
    let shows = state.recommendations.recommendations_for(user_id).await?;

    tracing::info!(
        request_id = %request_id,
        user_id,
        count = shows.len(),
        "Recommendations computed"
    );
    Ok(Json(shows))
}
