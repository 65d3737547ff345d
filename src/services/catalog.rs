use std::sync::Arc;

use crate::{
    db::{AuthorRepository, BookRepository},
    error::{AppError, AppResult},
    models::{Author, AuthorId, Book, BookId, NewAuthor, NewBook},
};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Width of the `isbn` and `isbn13` columns
const MAX_ISBN_LENGTH: usize = 13;

/// Books and authors with the validation rules the store does not enforce
#[derive(Clone)]
pub struct Catalog {
    books: Arc<dyn BookRepository>,
    authors: Arc<dyn AuthorRepository>,
}

fn validate_author(author: &mut NewAuthor) -> AppResult<()> {
    author.first_name = author.first_name.trim().to_string();
    author.last_name = author.last_name.trim().to_string();
    if author.first_name.is_empty() || author.last_name.is_empty() {
        return Err(AppError::InvalidInput(
            "Author's first and last name are required.".to_string(),
        ));
    }
    Ok(())
}

/// Trims the payload and checks required fields; returns the ISBN
fn validate_book(book: &mut NewBook) -> AppResult<String> {
    book.title = book.title.trim().to_string();
    let isbn = book
        .isbn
        .as_deref()
        .map(str::trim)
        .filter(|isbn| !isbn.is_empty())
        .map(str::to_string);

    // Both are required on every write
    let isbn = match (book.title.is_empty(), isbn) {
        (false, Some(isbn)) => isbn,
        _ => {
            return Err(AppError::InvalidInput(
                "Both title and ISBN are required.".to_string(),
            ))
        }
    };

    if isbn.chars().count() > MAX_ISBN_LENGTH {
        return Err(AppError::InvalidInput(
            "ISBN must be at most 13 characters.".to_string(),
        ));
    }

    // isbn13 is optional; blank means absent
    book.isbn13 = book
        .isbn13
        .as_deref()
        .map(str::trim)
        .filter(|isbn13| !isbn13.is_empty())
        .map(str::to_string);
    if let Some(isbn13) = &book.isbn13 {
        if isbn13.chars().count() > MAX_ISBN_LENGTH {
            return Err(AppError::InvalidInput(
                "ISBN13 must be at most 13 characters.".to_string(),
            ));
        }
    }

    for author in book.authors.iter_mut() {
        validate_author(author)?;
    }

    book.isbn = Some(isbn.clone());
    Ok(isbn)
}

impl Catalog {
    pub fn new(books: Arc<dyn BookRepository>, authors: Arc<dyn AuthorRepository>) -> Self {
        Self { books, authors }
    }

    pub async fn list_books(&self, limit: Option<i64>, offset: Option<i64>) -> AppResult<Vec<Book>> {
        // Out-of-range paging is clamped rather than rejected
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0).max(0);
        self.books.list_books(limit, offset).await
    }

    pub async fn get_book(&self, id: BookId) -> AppResult<Book> {
        self.books
            .get_book(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    pub async fn create_book(&self, mut book: NewBook) -> AppResult<Book> {
        let isbn = validate_book(&mut book)?;
        if self.books.isbn_taken(&isbn, None).await? {
            return Err(AppError::InvalidInput(
                "A book with this ISBN already exists.".to_string(),
            ));
        }

        let created = self.books.create_book(book).await?;
        tracing::info!(book_id = created.id, isbn = %isbn, "Book created");
        Ok(created)
    }

    pub async fn update_book(&self, id: BookId, mut book: NewBook) -> AppResult<Book> {
        let isbn = validate_book(&mut book)?;
        if self.books.isbn_taken(&isbn, Some(id)).await? {
            return Err(AppError::InvalidInput(
                "A book with this ISBN already exists.".to_string(),
            ));
        }

        self.books
            .update_book(id, book)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    pub async fn delete_book(&self, id: BookId) -> AppResult<()> {
        if !self.books.delete_book(id).await? {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.authors.list_authors().await
    }

    pub async fn get_author(&self, id: AuthorId) -> AppResult<Author> {
        self.authors
            .get_author(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    pub async fn create_author(&self, mut author: NewAuthor) -> AppResult<Author> {
        validate_author(&mut author)?;
        self.authors.create_author(author).await
    }

    pub async fn update_author(&self, id: AuthorId, mut author: NewAuthor) -> AppResult<Author> {
        validate_author(&mut author)?;
        self.authors
            .update_author(id, author)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    pub async fn delete_author(&self, id: AuthorId) -> AppResult<()> {
        if !self.authors.delete_author(id).await? {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        Ok(())
    }
}
