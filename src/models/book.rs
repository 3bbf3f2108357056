//! Book model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A catalog entry. `available` is kept in sync with the loans table by the
/// lending and return transactions: it is false exactly while one open loan
/// references the book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub available: bool,
}

impl Book {
    /// New catalog entry, available by default.
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        year: i32,
    ) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
            year,
            available: true,
        }
    }
}
