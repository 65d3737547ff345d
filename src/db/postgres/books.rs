use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;

use super::authors::upsert_author;
use crate::{
    db::BookRepository,
    error::{AppError, AppResult},
    models::{Author, Book, BookId, NewBook, Shelf},
};

const BOOK_COLUMNS: &str = "id, title, isbn, isbn13, language, average_rating, book_format, \
                            num_pages, publisher, publication_date, description, image_url";

#[derive(sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    isbn: Option<String>,
    isbn13: Option<String>,
    language: Option<String>,
    average_rating: Option<f64>,
    book_format: Option<String>,
    num_pages: Option<i32>,
    publisher: Option<String>,
    publication_date: Option<String>,
    description: String,
    image_url: Option<String>,
}

impl BookRow {
    fn into_book(self, authors: Vec<Author>, shelves: Vec<Shelf>) -> Book {
        Book {
            id: self.id,
            title: self.title,
            isbn: self.isbn,
            isbn13: self.isbn13,
            language: self.language,
            average_rating: self.average_rating,
            book_format: self.book_format,
            num_pages: self.num_pages,
            publisher: self.publisher,
            publication_date: self.publication_date,
            description: self.description,
            image_url: self.image_url,
            authors,
            shelves,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BookAuthorRow {
    book_id: i64,
    id: i64,
    first_name: String,
    last_name: String,
    date_of_birth: Option<NaiveDate>,
}

#[derive(sqlx::FromRow)]
struct BookShelfRow {
    book_id: i64,
    id: i64,
    name: String,
}

#[derive(Clone)]
pub struct PgBookRepository {
    pool: PgPool,
}

impl PgBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attaches authors and shelves to book rows, keeping row order
    async fn hydrate(&self, rows: Vec<BookRow>) -> AppResult<Vec<Book>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

        // Two queries for the whole page instead of two per book
        let author_rows = sqlx::query_as::<_, BookAuthorRow>(
            r#"
            SELECT ba.book_id, a.id, a.first_name, a.last_name, a.date_of_birth
            FROM book_authors ba
            JOIN authors a ON a.id = ba.author_id
            WHERE ba.book_id = ANY($1)
            ORDER BY ba.book_id, ba.position, a.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let shelf_rows = sqlx::query_as::<_, BookShelfRow>(
            r#"
            SELECT bs.book_id, s.id, s.name
            FROM book_shelves bs
            JOIN shelves s ON s.id = bs.shelf_id
            WHERE bs.book_id = ANY($1)
            ORDER BY bs.book_id, bs.position, s.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        // Group relation rows by book
        let mut authors: HashMap<i64, Vec<Author>> = HashMap::new();
        for row in author_rows {
            authors.entry(row.book_id).or_default().push(Author {
                id: row.id,
                first_name: row.first_name,
                last_name: row.last_name,
                date_of_birth: row.date_of_birth,
            });
        }

        let mut shelves: HashMap<i64, Vec<Shelf>> = HashMap::new();
        for row in shelf_rows {
            shelves.entry(row.book_id).or_default().push(Shelf {
                id: row.id,
                name: row.name,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                row.into_book(
                    authors.remove(&id).unwrap_or_default(),
                    shelves.remove(&id).unwrap_or_default(),
                )
            })
            .collect())
    }

    async fn load_created(&self, id: BookId) -> AppResult<Book> {
        self.get_book(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("book {} vanished after write", id)))
    }
}

/// Links the payload's authors and shelves to a book, creating them on first use
async fn link_relations(conn: &mut PgConnection, book_id: BookId, book: &NewBook) -> AppResult<()> {
    for (position, new_author) in book.authors.iter().enumerate() {
        let author = upsert_author(&mut *conn, new_author).await?;
        sqlx::query(
            "INSERT INTO book_authors (book_id, author_id, position) VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING",
        )
        .bind(book_id)
        .bind(author.id)
        .bind(position as i32)
        .execute(&mut *conn)
        .await?;
    }

    // Shelves upsert on their unique name
    for (position, name) in book.shelf_names().into_iter().enumerate() {
        let shelf_id: i64 = sqlx::query_scalar(
            "INSERT INTO shelves (name) VALUES ($1) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name RETURNING id",
        )
        .bind(&name)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            "INSERT INTO book_shelves (book_id, shelf_id, position) VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING",
        )
        .bind(book_id)
        .bind(shelf_id)
        .bind(position as i32)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn list_books(&self, limit: i64, offset: i64) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {} FROM books ORDER BY id LIMIT $1 OFFSET $2",
            BOOK_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn get_book(&self, id: BookId) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {} FROM books WHERE id = $1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn books_by_ids(&self, ids: &[BookId]) -> AppResult<Vec<Book>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {} FROM books WHERE id = ANY($1)",
            BOOK_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn all_books(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {} FROM books ORDER BY id",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn create_book(&self, book: NewBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, isbn, isbn13, language, average_rating, book_format,
                               num_pages, publisher, publication_date, description, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.isbn)
        .bind(&book.isbn13)
        .bind(&book.language)
        .bind(book.average_rating)
        .bind(&book.book_format)
        .bind(book.num_pages)
        .bind(&book.publisher)
        .bind(&book.publication_date)
        .bind(&book.description)
        .bind(&book.image_url)
        .fetch_one(&mut *tx)
        .await?;

        link_relations(&mut tx, id, &book).await?;
        tx.commit().await?;

        tracing::debug!(book_id = id, "Book created");
        self.load_created(id).await
    }

    async fn update_book(&self, id: BookId, book: NewBook) -> AppResult<Option<Book>> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE books SET title = $2, isbn = $3, isbn13 = $4, language = $5,
                average_rating = $6, book_format = $7, num_pages = $8, publisher = $9,
                publication_date = $10, description = $11, image_url = $12
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.isbn)
        .bind(&book.isbn13)
        .bind(&book.language)
        .bind(book.average_rating)
        .bind(&book.book_format)
        .bind(book.num_pages)
        .bind(&book.publisher)
        .bind(&book.publication_date)
        .bind(&book.description)
        .bind(&book.image_url)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(None);
        }

        // Relations are replaced wholesale
        sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM book_shelves WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        link_relations(&mut tx, id, &book).await?;
        tx.commit().await?;

        self.load_created(id).await.map(Some)
    }

    async fn delete_book(&self, id: BookId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn isbn_taken(&self, isbn: &str, excluding: Option<BookId>) -> AppResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(isbn)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }
}
