use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::is_unique_violation;
use crate::{
    db::FavoriteRepository,
    error::{AppError, AppResult},
    models::{BookId, Favorite, UserId},
};

#[derive(sqlx::FromRow)]
struct FavoriteRow {
    user_id: i64,
    book_id: i64,
    added_on: DateTime<Utc>,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Favorite {
            user_id: row.user_id,
            book_id: row.book_id,
            added_on: row.added_on,
        }
    }
}

#[derive(Clone)]
pub struct PgFavoriteRepository {
    pool: PgPool,
}

impl PgFavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteRepository for PgFavoriteRepository {
    async fn favorite_book_ids(&self, user: UserId) -> AppResult<Vec<BookId>> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT book_id FROM favorites WHERE user_id = $1 ORDER BY book_id")
                .bind(user)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids)
    }

    async fn list_favorites(&self, user: UserId) -> AppResult<Vec<Favorite>> {
        let rows = sqlx::query_as::<_, FavoriteRow>(
            "SELECT user_id, book_id, added_on FROM favorites WHERE user_id = $1 \
             ORDER BY added_on DESC, id DESC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Favorite::from).collect())
    }

    async fn is_favorite(&self, user: UserId, book: BookId) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = $1 AND book_id = $2)",
        )
        .bind(user)
        .bind(book)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn add_favorite(&self, user: UserId, book: BookId, max: usize) -> AppResult<Favorite> {
        let mut tx = self.pool.begin().await?;

        // Serialize adds per user so the count below cannot go stale
        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, FavoriteRow>(
            r#"
            INSERT INTO favorites (user_id, book_id)
            SELECT $1, $2
            WHERE (SELECT COUNT(*) FROM favorites WHERE user_id = $1) < $3
            RETURNING user_id, book_id, added_on
            "#,
        )
        .bind(user)
        .bind(book)
        .bind(max as i64)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::InvalidInput("This book is already in your favorites.".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        // No row means the cap was already reached
        let Some(row) = row else {
            return Err(AppError::favorites_full(max));
        };

        tx.commit().await?;
        Ok(row.into())
    }

    async fn remove_favorite(&self, user: UserId, book: BookId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND book_id = $2")
            .bind(user)
            .bind(book)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
