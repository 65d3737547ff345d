#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use shelfmark_api::{
    db::{AuthorRepository, BookRepository, FavoriteRepository, SimilarityStore, UserRepository},
    error::{AppError, AppResult},
    models::{
        Author, AuthorId, Book, BookId, BookSimilarity, Favorite, NewAuthor, NewBook, Shelf,
        UserId,
    },
    routes::AppState,
};

/// In-memory stand-in for every repository, sharing one catalog
#[derive(Default)]
pub struct InMemoryLibrary {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    books: BTreeMap<BookId, Book>,
    authors: BTreeMap<AuthorId, Author>,
    shelves: Vec<Shelf>,
    favorites: Vec<Favorite>,
    edges: Vec<BookSimilarity>,
    tokens: HashMap<String, UserId>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn upsert_author(&mut self, author: &NewAuthor) -> Author {
        if let Some(existing) = self
            .authors
            .values()
            .find(|a| a.first_name == author.first_name && a.last_name == author.last_name)
        {
            return existing.clone();
        }
        let created = Author {
            id: self.next_id(),
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
            date_of_birth: author.date_of_birth,
        };
        self.authors.insert(created.id, created.clone());
        created
    }

    fn upsert_shelf(&mut self, name: &str) -> Shelf {
        if let Some(existing) = self.shelves.iter().find(|s| s.name == name) {
            return existing.clone();
        }
        let created = Shelf {
            id: self.next_id(),
            name: name.to_string(),
        };
        self.shelves.push(created.clone());
        created
    }

    fn build_book(&mut self, id: BookId, payload: &NewBook) -> Book {
        let mut authors: Vec<Author> = Vec::new();
        for new_author in &payload.authors {
            let author = self.upsert_author(new_author);
            if !authors.contains(&author) {
                authors.push(author);
            }
        }
        let shelves = payload
            .shelf_names()
            .iter()
            .map(|name| self.upsert_shelf(name))
            .collect();

        Book {
            id,
            title: payload.title.clone(),
            isbn: payload.isbn.clone(),
            isbn13: payload.isbn13.clone(),
            language: payload.language.clone(),
            average_rating: payload.average_rating,
            book_format: payload.book_format.clone(),
            num_pages: payload.num_pages,
            publisher: payload.publisher.clone(),
            publication_date: payload.publication_date.clone(),
            description: payload.description.clone(),
            image_url: payload.image_url.clone(),
            authors,
            shelves,
        }
    }
}

impl InMemoryLibrary {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_token(&self, token: &str, user: UserId) {
        self.inner.lock().unwrap().tokens.insert(token.to_string(), user);
    }

    pub fn edges(&self) -> Vec<BookSimilarity> {
        self.inner.lock().unwrap().edges.clone()
    }

    pub fn state(self: &Arc<Self>) -> AppState {
        AppState::new(
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
        )
    }
}

#[async_trait]
impl BookRepository for InMemoryLibrary {
    async fn list_books(&self, limit: i64, offset: i64) -> AppResult<Vec<Book>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .books
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_book(&self, id: BookId) -> AppResult<Option<Book>> {
        Ok(self.inner.lock().unwrap().books.get(&id).cloned())
    }

    async fn books_by_ids(&self, ids: &[BookId]) -> AppResult<Vec<Book>> {
        let inner = self.inner.lock().unwrap();
        Ok(ids.iter().filter_map(|id| inner.books.get(id).cloned()).collect())
    }

    async fn all_books(&self) -> AppResult<Vec<Book>> {
        Ok(self.inner.lock().unwrap().books.values().cloned().collect())
    }

    async fn create_book(&self, book: NewBook) -> AppResult<Book> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let created = inner.build_book(id, &book);
        inner.books.insert(id, created.clone());
        Ok(created)
    }

    async fn update_book(&self, id: BookId, book: NewBook) -> AppResult<Option<Book>> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.books.contains_key(&id) {
            return Ok(None);
        }
        let updated = inner.build_book(id, &book);
        inner.books.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_book(&self, id: BookId) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let removed = inner.books.remove(&id).is_some();
        inner.favorites.retain(|f| f.book_id != id);
        inner.edges.retain(|e| e.book1 != id && e.book2 != id);
        Ok(removed)
    }

    async fn isbn_taken(&self, isbn: &str, excluding: Option<BookId>) -> AppResult<bool> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .books
            .values()
            .any(|b| b.isbn.as_deref() == Some(isbn) && Some(b.id) != excluding))
    }
}

#[async_trait]
impl AuthorRepository for InMemoryLibrary {
    async fn list_authors(&self) -> AppResult<Vec<Author>> {
        Ok(self.inner.lock().unwrap().authors.values().cloned().collect())
    }

    async fn get_author(&self, id: AuthorId) -> AppResult<Option<Author>> {
        Ok(self.inner.lock().unwrap().authors.get(&id).cloned())
    }

    async fn create_author(&self, author: NewAuthor) -> AppResult<Author> {
        Ok(self.inner.lock().unwrap().upsert_author(&author))
    }

    async fn update_author(&self, id: AuthorId, author: NewAuthor) -> AppResult<Option<Author>> {
        let mut inner = self.inner.lock().unwrap();
        match inner.authors.get_mut(&id) {
            Some(existing) => {
                existing.first_name = author.first_name;
                existing.last_name = author.last_name;
                existing.date_of_birth = author.date_of_birth;
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_author(&self, id: AuthorId) -> AppResult<bool> {
        Ok(self.inner.lock().unwrap().authors.remove(&id).is_some())
    }
}

#[async_trait]
impl FavoriteRepository for InMemoryLibrary {
    async fn favorite_book_ids(&self, user: UserId) -> AppResult<Vec<BookId>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .favorites
            .iter()
            .filter(|f| f.user_id == user)
            .map(|f| f.book_id)
            .collect())
    }

    async fn list_favorites(&self, user: UserId) -> AppResult<Vec<Favorite>> {
        let inner = self.inner.lock().unwrap();
        // Insertion order stands in for added_on
        Ok(inner
            .favorites
            .iter()
            .rev()
            .filter(|f| f.user_id == user)
            .cloned()
            .collect())
    }

    async fn is_favorite(&self, user: UserId, book: BookId) -> AppResult<bool> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .favorites
            .iter()
            .any(|f| f.user_id == user && f.book_id == book))
    }

    async fn add_favorite(&self, user: UserId, book: BookId, max: usize) -> AppResult<Favorite> {
        let mut inner = self.inner.lock().unwrap();
        let held: Vec<BookId> = inner
            .favorites
            .iter()
            .filter(|f| f.user_id == user)
            .map(|f| f.book_id)
            .collect();
        if held.contains(&book) {
            return Err(AppError::InvalidInput(
                "This book is already in your favorites.".to_string(),
            ));
        }
        if held.len() >= max {
            return Err(AppError::favorites_full(max));
        }
        let favorite = Favorite {
            user_id: user,
            book_id: book,
            added_on: Utc::now(),
        };
        inner.favorites.push(favorite.clone());
        Ok(favorite)
    }

    async fn remove_favorite(&self, user: UserId, book: BookId) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.favorites.len();
        inner
            .favorites
            .retain(|f| !(f.user_id == user && f.book_id == book));
        Ok(inner.favorites.len() < before)
    }
}

#[async_trait]
impl SimilarityStore for InMemoryLibrary {
    async fn replace_all(&self, edges: &[BookSimilarity]) -> AppResult<u64> {
        self.inner.lock().unwrap().edges = edges.to_vec();
        Ok(edges.len() as u64)
    }

    async fn outgoing(&self, book: BookId) -> AppResult<Vec<BookSimilarity>> {
        let inner = self.inner.lock().unwrap();
        let mut edges: Vec<BookSimilarity> = inner
            .edges
            .iter()
            .filter(|e| e.book1 == book && e.similarity > 0.0)
            .copied()
            .collect();
        edges.sort_by(|a, b| b.similarity.total_cmp(&a.similarity).then(a.book2.cmp(&b.book2)));
        Ok(edges)
    }

    async fn edges_from(&self, sources: &[BookId]) -> AppResult<Vec<BookSimilarity>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .edges
            .iter()
            .filter(|e| sources.contains(&e.book1) && !sources.contains(&e.book2))
            .copied()
            .collect())
    }
}

#[async_trait]
impl UserRepository for InMemoryLibrary {
    async fn user_for_token(&self, token: &str) -> AppResult<Option<UserId>> {
        Ok(self.inner.lock().unwrap().tokens.get(token).copied())
    }
}
