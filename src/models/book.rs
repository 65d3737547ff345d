use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type BookId = i64;
pub type AuthorId = i64;

/// A book together with its resolved authors and shelves
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub isbn: Option<String>,
    pub isbn13: Option<String>,
    pub language: Option<String>,
    pub average_rating: Option<f64>,
    pub book_format: Option<String>,
    pub num_pages: Option<i32>,
    pub publisher: Option<String>,
    pub publication_date: Option<String>,
    #[serde(default)]
    pub description: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub shelves: Vec<Shelf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub id: AuthorId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
}

impl Author {
    /// Token form used when building similarity documents
    pub fn token(&self) -> String {
        format!("{}_{}", self.first_name, self.last_name)
    }
}

/// Free-text tag attached to books; names are unique and stored lower-cased
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Shelf {
    #[serde(skip_serializing)]
    #[serde(default)]
    pub id: i64,
    pub name: String,
}

impl Shelf {
    /// Natural key for a shelf name as written by clients
    pub fn normalize_name(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

/// Author reference inside a book payload, resolved with get-or-create
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewAuthor {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewShelf {
    pub name: String,
}

/// Create or full-update payload for a book
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewBook {
    #[serde(default)]
    pub title: String,
    pub isbn: Option<String>,
    pub isbn13: Option<String>,
    pub language: Option<String>,
    pub average_rating: Option<f64>,
    pub book_format: Option<String>,
    pub num_pages: Option<i32>,
    pub publisher: Option<String>,
    pub publication_date: Option<String>,
    #[serde(default)]
    pub description: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub authors: Vec<NewAuthor>,
    #[serde(default)]
    pub shelves: Vec<NewShelf>,
}

impl NewBook {
    /// Shelf names after normalization, blanks and duplicates removed, order kept
    pub fn shelf_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::with_capacity(self.shelves.len());
        for shelf in &self.shelves {
            let name = Shelf::normalize_name(&shelf.name);
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}
