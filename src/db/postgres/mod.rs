use sqlx::{postgres::PgPoolOptions, PgPool};

mod authors;
mod books;
mod favorites;
mod similarities;
mod users;

pub use authors::PgAuthorRepository;
pub use books::PgBookRepository;
pub use favorites::PgFavoriteRepository;
pub use similarities::{PgSimilarityStore, MAX_INSERT_BATCH_SIZE};
pub use users::PgUserRepository;

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Whether a database error is a unique constraint violation
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}
