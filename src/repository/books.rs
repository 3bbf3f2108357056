//! Books repository for database operations

use sqlx::SqlitePool;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::book::Book,
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: SqlitePool,
}

impl BooksRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a book by ISBN
    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = ?1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    /// Snapshot of the whole catalog
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY isbn")
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// Insert a new book
    pub async fn insert(&self, book: &Book) -> AppResult<()> {
        debug!(isbn = %book.isbn, "Inserting book");

        sqlx::query(
            "INSERT INTO books (isbn, title, author, year, available) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.year)
        .bind(book.available)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_insert(e, "Book", &book.isbn))?;

        Ok(())
    }

    /// Delete a book; zero affected rows means it never existed
    pub async fn delete(&self, isbn: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = ?1")
            .bind(isbn)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", isbn)));
        }

        Ok(())
    }
}
