use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    db::{BookRepository, FavoriteRepository},
    error::{AppError, AppResult},
    models::{AddFavoriteResponse, Book, BookId, UserId, MAX_FAVORITES},
    services::recommendations::Recommender,
};

/// A user's bounded favorites list
#[derive(Clone)]
pub struct FavoriteService {
    favorites: Arc<dyn FavoriteRepository>,
    books: Arc<dyn BookRepository>,
    recommender: Recommender,
}

impl FavoriteService {
    pub fn new(
        favorites: Arc<dyn FavoriteRepository>,
        books: Arc<dyn BookRepository>,
        recommender: Recommender,
    ) -> Self {
        Self {
            favorites,
            books,
            recommender,
        }
    }

    /// Favorited books, most recently added first
    pub async fn list(&self, user: UserId) -> AppResult<Vec<Book>> {
        // Favorites arrive newest first; hydration must not reorder them
        let favorites = self.favorites.list_favorites(user).await?;
        let ids: Vec<BookId> = favorites.iter().map(|favorite| favorite.book_id).collect();

        let mut books: HashMap<BookId, Book> = self
            .books
            .books_by_ids(&ids)
            .await?
            .into_iter()
            .map(|book| (book.id, book))
            .collect();

        Ok(ids.iter().filter_map(|id| books.remove(id)).collect())
    }

    pub async fn add(&self, user: UserId, book: BookId) -> AppResult<AddFavoriteResponse> {
        if self.books.get_book(book).await?.is_none() {
            return Err(AppError::NotFound(format!("Book {} not found", book)));
        }

        if self.favorites.is_favorite(user, book).await? {
            return Err(AppError::InvalidInput(
                "This book is already in your favorites.".to_string(),
            ));
        }

        // The cap is enforced by the store together with the insert
        let favorite = self
            .favorites
            .add_favorite(user, book, MAX_FAVORITES)
            .await?;
        tracing::info!(user_id = user, book_id = book, "Favorite added");

        // A favorite with no stored neighbors still yields an empty list, not an error
        let recommendations = match self.recommender.recommend(user).await {
            Ok(scored) => scored.into_iter().map(|scored| scored.book).collect(),
            Err(AppError::EmptyFavorites) => Vec::new(),
            Err(e) => return Err(e),
        };

        Ok(AddFavoriteResponse {
            detail: "Book added to favorites.".to_string(),
            favorite,
            recommendations,
        })
    }

    pub async fn remove(&self, user: UserId, book: BookId) -> AppResult<()> {
        if !self.favorites.remove_favorite(user, book).await? {
            return Err(AppError::NotFound(format!(
                "Book {} is not in your favorites",
                book
            )));
        }
        tracing::info!(user_id = user, book_id = book, "Favorite removed");
        Ok(())
    }
}
