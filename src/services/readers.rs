//! Reader registry service

use std::collections::BTreeMap;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::LoanDetails,
        reader::{Reader, ReaderDetails},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct ReadersService {
    repository: Repository,
}

impl ReadersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new reader
    pub async fn register(&self, reader: Reader) -> AppResult<()> {
        self.repository.readers.insert(&reader).await?;

        tracing::info!(id = %reader.id, "Reader registered");
        Ok(())
    }

    /// Remove a reader. Refused while they hold an open loan.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.repository
            .readers
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reader {} not found", id)))?;

        if self.repository.loans.has_open_loans_for_reader(id).await? {
            return Err(AppError::Conflict(format!(
                "Reader {} has open loans and cannot be removed",
                id
            )));
        }

        self.repository.readers.delete(id).await?;

        tracing::info!(id, "Reader removed");
        Ok(())
    }

    /// Snapshot of every reader with their open loans attached, keyed by
    /// reader ID. A loan whose book cannot be resolved is dropped with a
    /// warning.
    pub async fn readers_with_loans(&self) -> AppResult<BTreeMap<String, ReaderDetails>> {
        let today = Utc::now().date_naive();
        let mut result = BTreeMap::new();

        for reader in self.repository.readers.list().await? {
            let mut details = ReaderDetails {
                id: reader.id.clone(),
                name: reader.name,
                loans: Vec::new(),
            };

            for loan in self
                .repository
                .loans
                .open_loans_for_reader(&reader.id)
                .await?
            {
                match self.repository.books.get_by_isbn(&loan.book_isbn).await? {
                    Some(book) => details.loans.push(LoanDetails {
                        id: loan.id,
                        issue_date: loan.issue_date,
                        due_date: loan.due_date,
                        is_overdue: loan.is_overdue_on(today),
                        book,
                    }),
                    None => {
                        tracing::warn!(
                            loan_id = loan.id,
                            isbn = %loan.book_isbn,
                            "Open loan references a missing book; skipping"
                        );
                    }
                }
            }

            result.insert(reader.id, details);
        }

        Ok(result)
    }
}
