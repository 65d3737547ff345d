use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    error::{AppError, AppResult},
    models::BookSimilarity,
    services::{corpus::CorpusEntry, tfidf::TfIdfMatrix},
};

/// Neighbors kept per book
pub const MAX_SIMILARS: usize = 50;

/// Books between progress log lines
pub const PROGRESS_INTERVAL: usize = 100;

/// Computes each book's top-K most similar books over a TF-IDF corpus
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    max_similars: usize,
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new(MAX_SIMILARS)
    }
}

impl SimilarityEngine {
    pub fn new(max_similars: usize) -> Self {
        Self { max_similars }
    }

    /// Returns directed `book -> neighbor` edges, grouped by source in corpus order
    ///
    /// Neighbors are ranked by descending similarity, ties going to the lower corpus
    /// index. A book is never its own neighbor and only strictly positive, finite
    /// similarities are kept.
    pub fn compute(&self, corpus: &[CorpusEntry]) -> AppResult<Vec<BookSimilarity>> {
        // Edges are keyed by book id, so ids must be unique
        let mut seen = HashSet::with_capacity(corpus.len());
        if let Some(duplicate) = corpus.iter().find(|entry| !seen.insert(entry.book_id)) {
            return Err(AppError::Computation(format!(
                "book {} appears more than once in the corpus",
                duplicate.book_id
            )));
        }

        if corpus.len() < 2 || self.max_similars == 0 {
            return Ok(Vec::new());
        }

        let documents: Vec<&str> = corpus.iter().map(|entry| entry.document.as_str()).collect();
        let matrix = TfIdfMatrix::fit_transform(&documents);
        tracing::info!(
            books = matrix.len(),
            terms = matrix.vocabulary_size(),
            "Vectorized documents"
        );

        // Built once and shared read-only across the rayon workers
        let postings = matrix.postings();
        let processed = AtomicUsize::new(0);
        let total = corpus.len();

        let neighbors: Vec<Vec<(usize, f64)>> = (0..total)
            .into_par_iter()
            .map(|row| {
                let ranked = self.top_neighbors(&matrix, &postings, row);
                let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % PROGRESS_INTERVAL == 0 {
                    tracing::info!(processed = done, total, "Processed books");
                }
                ranked
            })
            .collect();

        // Flatten back to book ids, keeping corpus order per source
        let edges: Vec<BookSimilarity> = neighbors
            .into_iter()
            .enumerate()
            .flat_map(|(row, ranked)| {
                let source = corpus[row].book_id;
                ranked.into_iter().map(move |(other, similarity)| BookSimilarity {
                    book1: source,
                    book2: corpus[other].book_id,
                    similarity,
                })
            })
            .collect();

        tracing::info!(processed = total, edges = edges.len(), "Similarity computation finished");
        Ok(edges)
    }

    /// Only books sharing at least one term can score above zero, so scores are
    /// accumulated over the postings of the row's terms instead of every pair.
    fn top_neighbors(
        &self,
        matrix: &TfIdfMatrix,
        postings: &[Vec<(usize, f64)>],
        row: usize,
    ) -> Vec<(usize, f64)> {
        // Accumulate the dot product term by term against every row sharing it
        let mut scores: HashMap<usize, f64> = HashMap::new();
        for &(term, weight) in matrix.row(row) {
            for &(other, other_weight) in &postings[term] {
                if other != row {
                    *scores.entry(other).or_insert(0.0) += weight * other_weight;
                }
            }
        }

        // Rounding can push identical rows a hair above 1
        let mut ranked: Vec<(usize, f64)> = scores
            .into_iter()
            .filter(|(_, score)| score.is_finite() && *score > 0.0)
            .map(|(other, score)| (other, score.min(1.0)))
            .collect();

        // Highest first, lower corpus index on ties
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(self.max_similars);
        ranked
    }
}
