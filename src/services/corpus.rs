use crate::models::{Book, BookId};

/// One similarity document per book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub book_id: BookId,
    pub document: String,
}

/// Renders a book's authors and shelves as a flat text document
///
/// Authors become `first_last` tokens and shelf names have their spaces replaced by
/// underscores. A book without authors or shelves contributes an empty segment.
pub fn build_document(book: &Book) -> String {
    let authors = book
        .authors
        .iter()
        .map(|author| author.token())
        .collect::<Vec<_>>()
        .join(" ");

    let shelves = book
        .shelves
        .iter()
        // Multi-word shelves stay a single term
        .map(|shelf| shelf.name.replace(' ', "_"))
        .collect::<Vec<_>>()
        .join(" ");

    format!("{} {}", authors, shelves)
}

/// Builds the corpus in input order; row `i` of the similarity matrix maps back to `books[i]`
pub fn build_corpus(books: &[Book]) -> Vec<CorpusEntry> {
    books
        .iter()
        .map(|book| CorpusEntry {
            book_id: book.id,
            document: build_document(book),
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Author, Shelf};

    pub(crate) fn book(id: BookId, authors: &[(&str, &str)], shelves: &[&str]) -> Book {
        Book {
            id,
            title: format!("Book {}", id),
            isbn: Some(format!("{:010}", id)),
            isbn13: None,
            language: None,
            average_rating: None,
            book_format: None,
            num_pages: None,
            publisher: None,
            publication_date: None,
            description: String::new(),
            image_url: None,
            authors: authors
                .iter()
                .enumerate()
                .map(|(i, (first, last))| Author {
                    id: i as i64 + 1,
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                    date_of_birth: None,
                })
                .collect(),
            shelves: shelves
                .iter()
                .enumerate()
                .map(|(i, name)| Shelf {
                    id: i as i64 + 1,
                    name: name.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_document_joins_authors_then_shelves() {
        let b = book(
            1,
            &[("Ursula", "Le Guin"), ("Frank", "Herbert")],
            &["science fiction", "classics"],
        );
        assert_eq!(
            build_document(&b),
            "Ursula_Le Guin Frank_Herbert science_fiction classics"
        );
    }

    #[test]
    fn test_missing_groups_leave_empty_segments() {
        assert_eq!(build_document(&book(1, &[], &["poetry"])), " poetry");
        assert_eq!(build_document(&book(2, &[("X", "Y")], &[])), "X_Y ");
        assert_eq!(build_document(&book(3, &[], &[])), " ");
    }

    #[test]
    fn test_corpus_preserves_book_order() {
        let books = vec![
            book(30, &[("A", "B")], &[]),
            book(10, &[("C", "D")], &[]),
            book(20, &[("E", "F")], &[]),
        ];
        let ids: Vec<BookId> = build_corpus(&books).iter().map(|e| e.book_id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }
}
