use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{NewUser, UserResponse},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(new_user): Json<NewUser>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.accounts.register(&new_user).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Checks credentials and returns the matching account
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .accounts
        .login(&request.username, &request.password)
        .await?;
    Ok(Json(user.into()))
}

pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.accounts.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
