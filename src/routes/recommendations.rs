use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::{AuthUser, RequestId},
    models::Book,
    routes::AppState,
};

/// Handler for recommendations endpoint
///
/// Returns up to five books ranked by summed similarity to the user's favorites.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    user: AuthUser,
) -> AppResult<Json<Vec<Book>>> {
    tracing::info!(
        request_id = %request_id,
        user_id = user.id,
        "Processing recommendation request"
    );

    let recommendations: Vec<Book> = state
        .recommender
        .recommend(user.id)
        .await?
        .into_iter()
        .map(|scored| scored.book)
        .collect();

    tracing::info!(
        request_id = %request_id,
        count = recommendations.len(),
        "Recommendations served"
    );

    Ok(Json(recommendations))
}
