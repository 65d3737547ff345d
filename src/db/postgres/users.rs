use async_trait::async_trait;
use sqlx::PgPool;

use crate::{db::UserRepository, error::AppResult, models::UserId};

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn user_for_token(&self, token: &str) -> AppResult<Option<UserId>> {
        let user_id: Option<i64> =
            sqlx::query_scalar("SELECT user_id FROM api_tokens WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user_id)
    }
}
