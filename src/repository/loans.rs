//! Loans repository: open-loan queries and the two transactional paths
//! (lend, return) that keep `books.available` and the loans table in step.

use chrono::{Duration, NaiveDate};
use sqlx::SqlitePool;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LOAN_PERIOD_DAYS},
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: SqlitePool,
}

impl LoansRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The open loan for a book, if any (at most one can exist)
    pub async fn open_loan_for_book(&self, isbn: &str) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE book_isbn = ?1 AND returned_date IS NULL",
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;

        Ok(loan)
    }

    /// All open loans for a reader, oldest first
    pub async fn open_loans_for_reader(&self, reader_id: &str) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE reader_id = ?1 AND returned_date IS NULL ORDER BY issue_date, id",
        )
        .bind(reader_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    pub async fn has_open_loan_for_book(&self, isbn: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE book_isbn = ?1 AND returned_date IS NULL)",
        )
        .bind(isbn)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn has_open_loans_for_reader(&self, reader_id: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE reader_id = ?1 AND returned_date IS NULL)",
        )
        .bind(reader_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Full circulation history for a book, open loan last
    pub async fn history_for_book(&self, isbn: &str) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE book_isbn = ?1 ORDER BY issue_date, id",
        )
        .bind(isbn)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Lend a book: flip availability and create the loan row in a single
    /// transaction. Any failure rolls both writes back.
    pub async fn create(
        &self,
        isbn: &str,
        reader_id: &str,
        issued_on: NaiveDate,
    ) -> AppResult<Loan> {
        let due_on = issued_on + Duration::days(LOAN_PERIOD_DAYS);

        debug!(isbn, reader_id, %due_on, "Creating loan");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::TransactionFailed(format!("lend {isbn}: {e}")))?;

        sqlx::query("UPDATE books SET available = FALSE WHERE isbn = ?1")
            .bind(isbn)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::TransactionFailed(format!("lend {isbn}: {e}")))?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO loans (book_isbn, reader_id, issue_date, due_date) \
             VALUES (?1, ?2, ?3, ?4) RETURNING id",
        )
        .bind(isbn)
        .bind(reader_id)
        .bind(issued_on)
        .bind(due_on)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::TransactionFailed(format!("lend {isbn}: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::TransactionFailed(format!("lend {isbn}: {e}")))?;

        Ok(Loan {
            id,
            book_isbn: isbn.to_string(),
            reader_id: reader_id.to_string(),
            issue_date: issued_on,
            due_date: due_on,
            returned_date: None,
        })
    }

    /// Return a book: close the matching open loan and flip availability in
    /// a single transaction. When no open loan matches (isbn, reader_id) the
    /// whole operation fails with `LoanNotFound` and the availability flag
    /// is left untouched.
    pub async fn close(
        &self,
        isbn: &str,
        reader_id: &str,
        returned_on: NaiveDate,
    ) -> AppResult<()> {
        debug!(isbn, reader_id, "Closing loan");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::TransactionFailed(format!("return {isbn}: {e}")))?;

        let result = sqlx::query(
            "UPDATE loans SET returned_date = ?3 \
             WHERE book_isbn = ?1 AND reader_id = ?2 AND returned_date IS NULL",
        )
        .bind(isbn)
        .bind(reader_id)
        .bind(returned_on)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::TransactionFailed(format!("return {isbn}: {e}")))?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Err(AppError::LoanNotFound(format!(
                "No open loan of {} to reader {}",
                isbn, reader_id
            )));
        }

        sqlx::query("UPDATE books SET available = TRUE WHERE isbn = ?1")
            .bind(isbn)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::TransactionFailed(format!("return {isbn}: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::TransactionFailed(format!("return {isbn}: {e}")))?;

        Ok(())
    }
}
