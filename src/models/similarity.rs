use serde::{Deserialize, Serialize};

use super::{Book, BookId};

/// Directed similarity edge `book1 -> book2`
///
/// Edges are a derived cache owned by the similarity job and are not symmetric:
/// `book2` being in the top neighbors of `book1` says nothing about the reverse.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BookSimilarity {
    pub book1: BookId,
    pub book2: BookId,
    pub similarity: f64,
}

/// A book paired with a similarity or aggregated recommendation score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredBook {
    pub book: Book,
    pub score: f64,
}
