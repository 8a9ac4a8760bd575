use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, Sse},
    Json,
};
use futures::Stream;
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{Favorite, Show, ShowId, UserId},
    routes::{events, AppState},
};

#[derive(Debug, Serialize)]
pub struct FavoriteStatus {
    pub show_id: ShowId,
    pub is_favorite: bool,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<Favorite>>> {
    Ok(Json(state.library.favorites(user_id).await?))
}

/// Saves the posted show as a favorite of the user
pub async fn add(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    Json(show): Json<Show>,
) -> AppResult<(StatusCode, Json<Favorite>)> {
    let favorite = state.library.add_favorite(user_id, &show).await?;
    Ok((StatusCode::CREATED, Json(favorite)))
}

pub async fn status(
    State(state): State<Arc<AppState>>,
    Path((user_id, show_id)): Path<(UserId, ShowId)>,
) -> AppResult<Json<FavoriteStatus>> {
    let is_favorite = state.library.is_favorite(user_id, show_id).await?;
    Ok(Json(FavoriteStatus {
        show_id,
        is_favorite,
    }))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path((user_id, show_id)): Path<(UserId, ShowId)>,
) -> AppResult<StatusCode> {
    state.library.remove_favorite(user_id, show_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Streams the user's full favorites list, once now and again after every change
pub async fn live(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    events::sse(state.library.watch_favorites(user_id), "favorites")
}

pub async fn live_all(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    events::sse(state.library.watch_all_favorites(), "favorites")
}

/// Favorites of every user, newest first
pub async fn list_all(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Favorite>>> {
    Ok(Json(state.library.all_favorites().await?))
}
