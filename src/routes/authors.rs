use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::AuthUser,
    models::{Author, AuthorId, NewAuthor},
    routes::AppState,
};

pub async fn list_authors(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Author>>> {
    Ok(Json(state.catalog.list_authors().await?))
}

pub async fn get_author(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AuthorId>,
) -> AppResult<Json<Author>> {
    Ok(Json(state.catalog.get_author(id).await?))
}

/// Get-or-create by name; an existing author is returned as-is
pub async fn create_author(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(payload): Json<NewAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let author = state.catalog.create_author(payload).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

pub async fn update_author(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<AuthorId>,
    Json(payload): Json<NewAuthor>,
) -> AppResult<Json<Author>> {
    Ok(Json(state.catalog.update_author(id, payload).await?))
}

pub async fn delete_author(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<AuthorId>,
) -> AppResult<StatusCode> {
    state.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
