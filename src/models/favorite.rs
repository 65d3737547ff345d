use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Book, BookId};

pub type UserId = i64;

/// Maximum number of favorites a user may keep
pub const MAX_FAVORITES: usize = 20;

/// A (user, book) favorite pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Favorite {
    pub user_id: UserId,
    pub book_id: BookId,
    pub added_on: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub book_id: BookId,
}

/// Response after adding a favorite: the new pair plus refreshed recommendations
#[derive(Debug, Serialize)]
pub struct AddFavoriteResponse {
    pub detail: String,
    pub favorite: Favorite,
    pub recommendations: Vec<Book>,
}
