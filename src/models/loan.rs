//! Loan model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::book::Book;

/// Fixed circulation period: due date = issue date + 14 days.
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Loan row from the database.
///
/// A loan is open while `returned_date` is NULL; returning the book closes
/// it in place, so the row doubles as circulation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: i64,
    pub book_isbn: String,
    pub reader_id: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned_date: Option<NaiveDate>,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.returned_date.is_none()
    }

    /// Overdue means the loan is still open and `today` is strictly after
    /// the due date.
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.is_open() && today > self.due_date
    }
}

/// Loan with its resolved book and computed overdue flag, for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanDetails {
    pub id: i64,
    pub book: Book,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub is_overdue: bool,
}
