//! Biblios - single-branch library circulation core
//!
//! Tracks a catalog of books, a registry of readers and the loans linking
//! them over a local SQLite store. The presentation layer (a desktop form
//! interface) calls into [`Services`] and renders the results; all business
//! rules and transactional guarantees live here.

use sqlx::SqlitePool;

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::{AppConfig, DatabaseConfig};
pub use error::{AppError, AppResult};
pub use services::Services;

use repository::Repository;

/// Handle to an open library database.
///
/// Owns the connection pool: acquired at startup with [`Library::open`],
/// released with [`Library::close`] on shutdown.
#[derive(Clone)]
pub struct Library {
    pool: SqlitePool,
    /// The service API consumed by the presentation layer.
    pub services: Services,
}

impl Library {
    /// Open (creating and migrating if needed) the configured database.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        let pool = db::connect(config).await?;
        let services = Services::new(Repository::new(pool.clone()));

        Ok(Self { pool, services })
    }

    /// Throwaway in-memory library, used by tests.
    pub async fn open_in_memory() -> AppResult<Self> {
        Self::open(&DatabaseConfig::in_memory()).await
    }

    /// The underlying pool, for queries the repositories don't cover.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// True when the store answers queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Close the connection pool. All operations fail afterwards.
    pub async fn close(&self) {
        tracing::info!("Closing database");
        self.pool.close().await;
    }
}
