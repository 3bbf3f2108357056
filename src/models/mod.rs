//! Data models for the circulation core

pub mod book;
pub mod loan;
pub mod reader;

// Re-export commonly used types
pub use book::Book;
pub use loan::{Loan, LoanDetails, LOAN_PERIOD_DAYS};
pub use reader::{Reader, ReaderDetails};
