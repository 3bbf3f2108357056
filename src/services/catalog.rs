//! Catalog management service

use std::collections::BTreeMap;

use crate::{
    error::{AppError, AppResult},
    models::book::Book,
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add a book to the catalog; a new book is always available
    pub async fn add_book(&self, book: Book) -> AppResult<()> {
        let book = Book {
            available: true,
            ..book
        };
        self.repository.books.insert(&book).await?;

        tracing::info!(isbn = %book.isbn, title = %book.title, "Book added");
        Ok(())
    }

    /// Delete a book. Refused while an open loan references it.
    pub async fn delete_book(&self, isbn: &str) -> AppResult<()> {
        self.repository
            .books
            .get_by_isbn(isbn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", isbn)))?;

        if self.repository.loans.has_open_loan_for_book(isbn).await? {
            return Err(AppError::Conflict(format!(
                "Book {} has an open loan and cannot be deleted",
                isbn
            )));
        }

        self.repository.books.delete(isbn).await?;

        tracing::info!(isbn, "Book deleted");
        Ok(())
    }

    /// Look up a book by ISBN; absence is not an error
    pub async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        self.repository.books.get_by_isbn(isbn).await
    }

    /// Snapshot of the whole catalog, keyed by ISBN
    pub async fn books(&self) -> AppResult<BTreeMap<String, Book>> {
        let books = self.repository.books.list().await?;

        Ok(books.into_iter().map(|b| (b.isbn.clone(), b)).collect())
    }

    /// Case-insensitive substring search against title and author.
    ///
    /// A blank query returns the full catalog. Matching is done in Rust
    /// rather than with SQL LOWER(), which only folds ASCII.
    pub async fn search_books(&self, query: &str) -> AppResult<Vec<Book>> {
        let books = self.repository.books.list().await?;

        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(books);
        }

        Ok(books
            .into_iter()
            .filter(|b| {
                b.title.to_lowercase().contains(&needle)
                    || b.author.to_lowercase().contains(&needle)
            })
            .collect())
    }
}
