use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};

use super::is_unique_violation;
use crate::{
    db::AuthorRepository,
    error::{AppError, AppResult},
    models::{Author, AuthorId, NewAuthor},
};

#[derive(sqlx::FromRow)]
struct AuthorRow {
    id: i64,
    first_name: String,
    last_name: String,
    date_of_birth: Option<NaiveDate>,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Author {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            date_of_birth: row.date_of_birth,
        }
    }
}

/// Get-or-create an author by `(first_name, last_name)`
///
/// An existing row is returned untouched; `date_of_birth` only applies on insert.
pub(super) async fn upsert_author(conn: &mut PgConnection, author: &NewAuthor) -> AppResult<Author> {
    let row = sqlx::query_as::<_, AuthorRow>(
        r#"
        INSERT INTO authors (first_name, last_name, date_of_birth)
        VALUES ($1, $2, $3)
        ON CONFLICT (first_name, last_name) DO UPDATE SET first_name = EXCLUDED.first_name
        RETURNING id, first_name, last_name, date_of_birth
        "#,
    )
    .bind(&author.first_name)
    .bind(&author.last_name)
    .bind(author.date_of_birth)
    .fetch_one(conn)
    .await?;

    Ok(row.into())
}

#[derive(Clone)]
pub struct PgAuthorRepository {
    pool: PgPool,
}

impl PgAuthorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorRepository for PgAuthorRepository {
    async fn list_authors(&self) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, AuthorRow>(
            "SELECT id, first_name, last_name, date_of_birth FROM authors ORDER BY last_name, first_name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Author::from).collect())
    }

    async fn get_author(&self, id: AuthorId) -> AppResult<Option<Author>> {
        let row = sqlx::query_as::<_, AuthorRow>(
            "SELECT id, first_name, last_name, date_of_birth FROM authors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Author::from))
    }

    async fn create_author(&self, author: NewAuthor) -> AppResult<Author> {
        let mut conn = self.pool.acquire().await?;
        upsert_author(&mut conn, &author).await
    }

    async fn update_author(&self, id: AuthorId, author: NewAuthor) -> AppResult<Option<Author>> {
        let row = sqlx::query_as::<_, AuthorRow>(
            r#"
            UPDATE authors SET first_name = $2, last_name = $3, date_of_birth = $4
            WHERE id = $1
            RETURNING id, first_name, last_name, date_of_birth
            "#,
        )
        .bind(id)
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(author.date_of_birth)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::InvalidInput("An author with this name already exists.".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(row.map(Author::from))
    }

    async fn delete_author(&self, id: AuthorId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
