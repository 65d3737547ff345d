pub mod book;
pub mod favorite;
pub mod similarity;

pub use book::{Author, AuthorId, Book, BookId, NewAuthor, NewBook, NewShelf, Shelf};
pub use favorite::{AddFavoriteRequest, AddFavoriteResponse, Favorite, UserId, MAX_FAVORITES};
pub use similarity::{BookSimilarity, ScoredBook};
