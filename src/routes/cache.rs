use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    routes::AppState,
    services::maintenance,
};

#[derive(Debug, Deserialize)]
pub struct EvictParams {
    pub older_than_hours: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct EvictResponse {
    pub removed: u64,
}

/// Drops cached shows older than `older_than_hours`, or the configured max age
pub async fn evict(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<EvictParams>,
) -> AppResult<Json<EvictResponse>> {
    let max_age = match params.older_than_hours {
        Some(hours) => chrono::Duration::try_hours(hours)
            .filter(|age| *age >= chrono::Duration::zero())
            .ok_or_else(|| {
                AppError::InvalidInput(format!("Invalid older_than_hours: {}", hours))
            })?,
        None => state.cache_max_age,
    };

    let removed = maintenance::evict_stale_shows(state.cache.as_ref(), max_age).await?;

    tracing::info!(request_id = %request_id, removed, "Manual cache eviction");
    Ok(Json(EvictResponse { removed }))
}
