use std::sync::Arc;
use std::time::Instant;

use crate::{
    db::{BookRepository, SimilarityStore},
    error::{AppError, AppResult},
    services::{corpus::build_corpus, similarity::SimilarityEngine},
};

/// Outcome of one similarity rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSummary {
    pub books: usize,
    pub edges: u64,
}

/// Rebuilds the similarity table from the current catalog
///
/// Computation happens before the store is touched, so a failure there leaves the
/// previous similarity set in place; the replace itself is all-or-nothing.
pub async fn run_similarity_job(
    books: Arc<dyn BookRepository>,
    store: Arc<dyn SimilarityStore>,
    engine: SimilarityEngine,
) -> AppResult<JobSummary> {
    let start = Instant::now();

    tracing::info!("Fetching book data");
    let catalog = books.all_books().await?;
    let total = catalog.len();
    tracing::info!(total_books = total, "Preparing data for vectorization");

    let corpus = build_corpus(&catalog);
    // Only the documents are needed from here on
    drop(catalog);

    // CPU-bound; keep it off the async workers
    let edges = tokio::task::spawn_blocking(move || engine.compute(&corpus))
        .await
        .map_err(|e| AppError::Computation(e.to_string()))??;

    // Nothing has touched the store until this point
    tracing::info!(edges = edges.len(), "Storing similarities");
    let stored = store.replace_all(&edges).await?;

    tracing::info!(
        books = total,
        edges = stored,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Similarity job finished"
    );

    Ok(JobSummary {
        books: total,
        edges: stored,
    })
}
