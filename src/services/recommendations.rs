use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::{
    db::{BookRepository, FavoriteRepository, SimilarityStore},
    error::{AppError, AppResult},
    models::{BookId, BookSimilarity, ScoredBook, UserId},
};

/// Number of books returned by a recommendation request
pub const RECOMMENDATION_LIMIT: usize = 5;

/// Ranks candidate books by summed similarity to the favorites
///
/// A candidate similar to several favorites accumulates each contribution. Targets
/// inside `favorites` are skipped. Ties go to the lower book id.
pub fn rank_candidates(
    favorites: &[BookId],
    edges: &[BookSimilarity],
    limit: usize,
) -> Vec<(BookId, f64)> {
    let favorites: HashSet<BookId> = favorites.iter().copied().collect();

    // Summing in (target, source) order keeps scores bit-identical across calls
    let mut contributions: Vec<&BookSimilarity> = edges
        .iter()
        .filter(|edge| favorites.contains(&edge.book1) && !favorites.contains(&edge.book2))
        .filter(|edge| edge.similarity.is_finite())
        .collect();
    contributions.sort_by_key(|edge| (edge.book2, edge.book1));

    // Sum, not average: agreeing favorites reinforce a candidate
    let mut scores: BTreeMap<BookId, f64> = BTreeMap::new();
    for edge in contributions {
        *scores.entry(edge.book2).or_insert(0.0) += edge.similarity;
    }

    let mut ranked: Vec<(BookId, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

/// Read path over favorites and the similarity store
#[derive(Clone)]
pub struct Recommender {
    favorites: Arc<dyn FavoriteRepository>,
    similarities: Arc<dyn SimilarityStore>,
    books: Arc<dyn BookRepository>,
}

impl Recommender {
    pub fn new(
        favorites: Arc<dyn FavoriteRepository>,
        similarities: Arc<dyn SimilarityStore>,
        books: Arc<dyn BookRepository>,
    ) -> Self {
        Self {
            favorites,
            similarities,
            books,
        }
    }

    /// Top books for a user, best first; fails with `EmptyFavorites` when there is nothing to seed from
    pub async fn recommend(&self, user: UserId) -> AppResult<Vec<ScoredBook>> {
        let favorites = self.favorites.favorite_book_ids(user).await?;
        if favorites.is_empty() {
            return Err(AppError::EmptyFavorites);
        }

        // Only edges leaving the favorites and landing outside them
        let edges = self.similarities.edges_from(&favorites).await?;
        let ranked = rank_candidates(&favorites, &edges, RECOMMENDATION_LIMIT);

        tracing::debug!(
            user_id = user,
            favorites = favorites.len(),
            edges = edges.len(),
            recommended = ranked.len(),
            "Ranked recommendation candidates"
        );

        self.hydrate(ranked).await
    }

    /// Stored neighbors of a single book, most similar first
    pub async fn similar_to(&self, book: BookId) -> AppResult<Vec<ScoredBook>> {
        let edges = self.similarities.outgoing(book).await?;
        let ranked = edges
            .into_iter()
            .filter(|edge| edge.similarity > 0.0)
            .map(|edge| (edge.book2, edge.similarity))
            .collect();

        self.hydrate(ranked).await
    }

    /// Resolves ranked ids to books, keeping rank order and dropping ids that no longer exist
    async fn hydrate(&self, ranked: Vec<(BookId, f64)>) -> AppResult<Vec<ScoredBook>> {
        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        // One round trip for all candidates; the store returns them unordered
        let ids: Vec<BookId> = ranked.iter().map(|(id, _)| *id).collect();
        let mut books: HashMap<BookId, _> = self
            .books
            .books_by_ids(&ids)
            .await?
            .into_iter()
            .map(|book| (book.id, book))
            .collect();

        // Walk the ranking so the output keeps rank order
        Ok(ranked
            .into_iter()
            .filter_map(|(id, score)| books.remove(&id).map(|book| ScoredBook { book, score }))
            .collect())
    }
}
