use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("You have no favorite books yet; add some to get recommendations")]
    EmptyFavorites,

    #[error("Authentication credentials were not provided or are invalid")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Similarity computation failed: {0}")]
    Computation(String),

    #[error("Similarity store replace failed: {0}")]
    StoreReplace(#[source] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Rejection for a user who already holds `max` favorites
    pub fn favorites_full(max: usize) -> Self {
        AppError::InvalidInput(format!("You can have a maximum of {} favorite books.", max))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::EmptyFavorites | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_)
            | AppError::Computation(_)
            | AppError::StoreReplace(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::NotFound(msg) | AppError::InvalidInput(msg) => msg.clone(),
            _ => self.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
