use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    db::{
        postgres::{
            PgAuthorRepository, PgBookRepository, PgFavoriteRepository, PgSimilarityStore,
            PgUserRepository,
        },
        AuthorRepository, BookRepository, FavoriteRepository, SimilarityStore, UserRepository,
    },
    services::{Catalog, FavoriteService, Recommender},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub favorites: FavoriteService,
    pub recommender: Recommender,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    /// Wires the services over the given repositories
    pub fn new(
        books: Arc<dyn BookRepository>,
        authors: Arc<dyn AuthorRepository>,
        favorites: Arc<dyn FavoriteRepository>,
        similarities: Arc<dyn SimilarityStore>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        let recommender = Recommender::new(favorites.clone(), similarities, books.clone());

        Self {
            catalog: Catalog::new(books.clone(), authors),
            favorites: FavoriteService::new(favorites, books, recommender.clone()),
            recommender,
            users,
        }
    }

    /// Production state backed by PostgreSQL
    pub fn from_pool(pool: PgPool) -> Self {
        Self::new(
            Arc::new(PgBookRepository::new(pool.clone())),
            Arc::new(PgAuthorRepository::new(pool.clone())),
            Arc::new(PgFavoriteRepository::new(pool.clone())),
            Arc::new(PgSimilarityStore::new(pool.clone())),
            Arc::new(PgUserRepository::new(pool)),
        )
    }
}
