//! Lending service: the state machine for a loan.
//!
//! A book is either Available (flag true, no open loan) or On Loan (flag
//! false, exactly one open loan). Business rules are checked here; the
//! repository applies the two-write state change atomically.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::loan::Loan,
    repository::Repository,
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
}

impl CirculationService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Lend a book to a reader for the fixed circulation period.
    pub async fn lend(&self, isbn: &str, reader_id: &str) -> AppResult<Loan> {
        let book = self
            .repository
            .books
            .get_by_isbn(isbn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", isbn)))?;

        if !book.available {
            return Err(AppError::AlreadyLent(format!(
                "Book {} is already lent out",
                isbn
            )));
        }

        self.repository
            .readers
            .get_by_id(reader_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reader {} not found", reader_id)))?;

        let loan = self
            .repository
            .loans
            .create(isbn, reader_id, Utc::now().date_naive())
            .await?;

        tracing::info!(isbn, reader_id, due = %loan.due_date, "Book lent");
        Ok(loan)
    }

    /// Return a lent book.
    pub async fn return_book(&self, isbn: &str, reader_id: &str) -> AppResult<()> {
        let book = self
            .repository
            .books
            .get_by_isbn(isbn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", isbn)))?;

        if book.available {
            return Err(AppError::NotOnLoan(format!(
                "Book {} is not on loan",
                isbn
            )));
        }

        self.repository
            .loans
            .close(isbn, reader_id, Utc::now().date_naive())
            .await?;

        tracing::info!(isbn, reader_id, "Book returned");
        Ok(())
    }

    /// Open loans held by a reader, oldest first.
    pub async fn loans_for_reader(&self, reader_id: &str) -> AppResult<Vec<Loan>> {
        self.repository
            .readers
            .get_by_id(reader_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reader {} not found", reader_id)))?;

        self.repository.loans.open_loans_for_reader(reader_id).await
    }
}
