//! Readers repository for database operations

use sqlx::SqlitePool;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::reader::Reader,
};

#[derive(Clone)]
pub struct ReadersRepository {
    pool: SqlitePool,
}

impl ReadersRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reader by ID
    pub async fn get_by_id(&self, id: &str) -> AppResult<Option<Reader>> {
        let reader = sqlx::query_as::<_, Reader>("SELECT * FROM readers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(reader)
    }

    /// Snapshot of all registered readers
    pub async fn list(&self) -> AppResult<Vec<Reader>> {
        let readers = sqlx::query_as::<_, Reader>("SELECT * FROM readers ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(readers)
    }

    /// Register a new reader
    pub async fn insert(&self, reader: &Reader) -> AppResult<()> {
        debug!(id = %reader.id, "Registering reader");

        sqlx::query("INSERT INTO readers (id, name) VALUES (?1, ?2)")
            .bind(&reader.id)
            .bind(&reader.name)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_insert(e, "Reader", &reader.id))?;

        Ok(())
    }

    /// Delete a reader; zero affected rows means they never existed
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM readers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Reader {} not found", id)));
        }

        Ok(())
    }
}
