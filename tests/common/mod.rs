//! Shared helpers for integration tests.

#![allow(dead_code)]

use biblios::models::{Book, Reader};
use biblios::Library;

pub async fn library() -> Library {
    Library::open_in_memory()
        .await
        .expect("open in-memory library")
}

pub fn dune() -> Book {
    Book::new("ISBN-1", "Dune", "Herbert", 1965)
}

pub fn foundation() -> Book {
    Book::new("ISBN-2", "Foundation", "Asimov", 1951)
}

pub fn alice() -> Reader {
    Reader::new("R1", "Alice")
}

pub fn bob() -> Reader {
    Reader::new("R2", "Bob")
}

/// The core invariant: a book's availability flag must agree with the
/// absence of an open loan referencing it.
pub async fn assert_availability_consistent(library: &Library) {
    let rows: Vec<(String, bool, bool)> = sqlx::query_as(
        "SELECT isbn, available, \
         EXISTS(SELECT 1 FROM loans l WHERE l.book_isbn = b.isbn AND l.returned_date IS NULL) \
         FROM books b",
    )
    .fetch_all(library.pool())
    .await
    .expect("query invariant snapshot");

    for (isbn, available, has_open_loan) in rows {
        assert_eq!(
            available, !has_open_loan,
            "availability flag for {isbn} disagrees with open-loan state"
        );
    }
}
