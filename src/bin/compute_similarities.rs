use clap::Parser;
use std::sync::Arc;

use shelfmark_api::{
    config::Config,
    db::{
        create_pool,
        postgres::{PgBookRepository, PgSimilarityStore, MAX_INSERT_BATCH_SIZE},
        run_migrations, INSERT_BATCH_SIZE,
    },
    services::{
        similarity::{SimilarityEngine, MAX_SIMILARS},
        similarity_job::run_similarity_job,
    },
    telemetry,
};

/// Compute and store book similarities from authors and shelves
#[derive(clap::Parser, Debug)]
#[command(name = "compute-similarities")]
struct Cli {
    /// Neighbors kept per book
    #[arg(long, default_value_t = MAX_SIMILARS)]
    max_similars: usize,

    /// Similarity rows per INSERT statement
    #[arg(long, default_value_t = INSERT_BATCH_SIZE, value_parser = parse_batch_size)]
    batch_size: usize,
}

fn parse_batch_size(value: &str) -> Result<usize, String> {
    let size: usize = value.parse().map_err(|e| format!("{}", e))?;
    if (1..=MAX_INSERT_BATCH_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(format!("batch size must be between 1 and {}", MAX_INSERT_BATCH_SIZE))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing();

    let config = Config::from_env()?;
    let pool = create_pool(&config.database_url, config.max_db_connections).await?;
    run_migrations(&pool).await?;

    // Same repositories the server uses
    let books = Arc::new(PgBookRepository::new(pool.clone()));
    let store = Arc::new(PgSimilarityStore::new(pool).with_batch_size(cli.batch_size));

    match run_similarity_job(books, store, SimilarityEngine::new(cli.max_similars)).await {
        Ok(summary) => {
            tracing::info!(
                books = summary.books,
                edges = summary.edges,
                "Successfully computed and stored book similarities"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Similarity job failed; previous similarities kept");
            Err(e.into())
        }
    }
}
