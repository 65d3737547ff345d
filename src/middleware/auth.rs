use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use std::sync::Arc;

use crate::{error::AppError, models::UserId, routes::AppState};

/// The user behind a request's `Authorization: Bearer <token>` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Missing and unknown tokens are indistinguishable to the caller
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;

        match state.users.user_for_token(token).await? {
            Some(id) => Ok(AuthUser { id }),
            None => {
                tracing::debug!("Rejected unknown API token");
                Err(AppError::Unauthorized)
            }
        }
    }
}
