use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::AuthUser,
    models::{Book, BookId, NewBook},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SimilarBookResponse {
    pub book: Book,
    pub similarity: f64,
}

/// Lists books ordered by id
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBooksQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.catalog.list_books(query.limit, query.offset).await?;
    Ok(Json(books))
}

pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<BookId>,
) -> AppResult<Json<Book>> {
    Ok(Json(state.catalog.get_book(id).await?))
}

pub async fn create_book(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<NewBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    tracing::info!(user_id = user.id, title = %payload.title, "Creating book");
    let book = state.catalog.create_book(payload).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn update_book(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<BookId>,
    Json(payload): Json<NewBook>,
) -> AppResult<Json<Book>> {
    tracing::info!(user_id = user.id, book_id = id, "Updating book");
    Ok(Json(state.catalog.update_book(id, payload).await?))
}

pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<BookId>,
) -> AppResult<StatusCode> {
    state.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Stored neighbors of a book, most similar first
pub async fn similar_books(
    State(state): State<Arc<AppState>>,
    Path(id): Path<BookId>,
) -> AppResult<Json<Vec<SimilarBookResponse>>> {
    state.catalog.get_book(id).await?;

    let similar = state
        .recommender
        .similar_to(id)
        .await?
        .into_iter()
        .map(|scored| SimilarBookResponse {
            book: scored.book,
            similarity: scored.score,
        })
        .collect();

    Ok(Json(similar))
}
