use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::{AuthUser, RequestId},
    models::{AddFavoriteRequest, AddFavoriteResponse, Book, BookId},
    routes::AppState,
};

pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> AppResult<Json<Vec<Book>>> {
    Ok(Json(state.favorites.list(user.id).await?))
}

/// Adds a favorite and answers with refreshed recommendations
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    user: AuthUser,
    Json(request): Json<AddFavoriteRequest>,
) -> AppResult<(StatusCode, Json<AddFavoriteResponse>)> {
    tracing::info!(
        request_id = %request_id,
        user_id = user.id,
        book_id = request.book_id,
        "Adding favorite"
    );

    let response = state.favorites.add(user.id, request.book_id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    user: AuthUser,
    Path(book_id): Path<BookId>,
) -> AppResult<StatusCode> {
    tracing::info!(
        request_id = %request_id,
        user_id = user.id,
        book_id,
        "Removing favorite"
    );

    state.favorites.remove(user.id, book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
