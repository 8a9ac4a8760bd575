use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::sse::{Event, Sse},
    Json,
};
use futures::Stream;
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{SearchHistoryEntry, UserId},
    routes::{events, AppState},
};

#[derive(Debug, Serialize)]
pub struct ClearedHistory {
    pub removed: u64,
}

/// The user's most recent searches, newest first
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<SearchHistoryEntry>>> {
    Ok(Json(state.library.history(user_id).await?))
}

pub async fn clear(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<ClearedHistory>> {
    let removed = state.library.clear_history(user_id).await?;
    Ok(Json(ClearedHistory { removed }))
}

pub async fn list_all(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<SearchHistoryEntry>>> {
    Ok(Json(state.library.all_history().await?))
}

/// Streams the user's recent searches after every change
pub async fn live(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    events::sse(state.library.watch_history(user_id), "history")
}

pub async fn live_all(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    events::sse(state.library.watch_all_history(), "history")
}
