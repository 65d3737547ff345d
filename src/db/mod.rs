//! Persistence seam.
//!
//! Each concern is a trait so services and handlers can run against mocks or
//! in-memory stores; `postgres` holds the production implementations.

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{Author, AuthorId, Book, BookId, BookSimilarity, Favorite, NewAuthor, NewBook, UserId},
};

pub mod postgres;

pub use postgres::{create_pool, run_migrations};

/// Number of similarity rows written per INSERT statement
pub const INSERT_BATCH_SIZE: usize = 10_000;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn list_books(&self, limit: i64, offset: i64) -> AppResult<Vec<Book>>;

    async fn get_book(&self, id: BookId) -> AppResult<Option<Book>>;

    /// Fetch the given books; order of the result is unspecified
    async fn books_by_ids(&self, ids: &[BookId]) -> AppResult<Vec<Book>>;

    /// Every book with authors and shelves resolved, ordered by id
    async fn all_books(&self) -> AppResult<Vec<Book>>;

    /// Insert a book, resolving authors and shelves with get-or-create
    async fn create_book(&self, book: NewBook) -> AppResult<Book>;

    /// Replace a book's fields, authors and shelves; `None` when the book does not exist
    async fn update_book(&self, id: BookId, book: NewBook) -> AppResult<Option<Book>>;

    async fn delete_book(&self, id: BookId) -> AppResult<bool>;

    /// Whether a book other than `excluding` already uses `isbn`
    async fn isbn_taken(&self, isbn: &str, excluding: Option<BookId>) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    async fn list_authors(&self) -> AppResult<Vec<Author>>;

    async fn get_author(&self, id: AuthorId) -> AppResult<Option<Author>>;

    /// Get-or-create keyed by `(first_name, last_name)`
    async fn create_author(&self, author: NewAuthor) -> AppResult<Author>;

    async fn update_author(&self, id: AuthorId, author: NewAuthor) -> AppResult<Option<Author>>;

    async fn delete_author(&self, id: AuthorId) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    async fn favorite_book_ids(&self, user: UserId) -> AppResult<Vec<BookId>>;

    /// Favorites of a user, most recently added first
    async fn list_favorites(&self, user: UserId) -> AppResult<Vec<Favorite>>;

    async fn is_favorite(&self, user: UserId, book: BookId) -> AppResult<bool>;

    /// Inserts the pair unless the user already holds `max` favorites
    ///
    /// The count check and the insert are one atomic step, so concurrent adds
    /// can never push a user past `max`.
    async fn add_favorite(&self, user: UserId, book: BookId, max: usize) -> AppResult<Favorite>;

    async fn remove_favorite(&self, user: UserId, book: BookId) -> AppResult<bool>;
}

/// The similarity table is written only through `replace_all`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SimilarityStore: Send + Sync {
    /// Atomically swap the whole edge set; on failure the previous set stays intact
    async fn replace_all(&self, edges: &[BookSimilarity]) -> AppResult<u64>;

    /// Outgoing edges of `book` with similarity above 0, most similar first
    async fn outgoing(&self, book: BookId) -> AppResult<Vec<BookSimilarity>>;

    /// Edges whose source is in `sources` and whose target is not
    async fn edges_from(&self, sources: &[BookId]) -> AppResult<Vec<BookSimilarity>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Resolve an API bearer token to its user
    async fn user_for_token(&self, token: &str) -> AppResult<Option<UserId>>;
}
