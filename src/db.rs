//! SQLite pool construction and embedded migrations.
//!
//! The database file is the single shared resource of the process: it is
//! opened once at startup, migrated idempotently, and closed on shutdown.
//! WAL journal mode keeps readers from blocking the writer; SQLite's default
//! isolation (serializable) satisfies the read-committed-or-stronger
//! requirement of the service layer.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

/// Embedded migrations from the `migrations/` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Open (creating if missing) and migrate the database.
///
/// Safe to call on every startup: migrations already applied are skipped.
pub async fn connect(config: &DatabaseConfig) -> AppResult<SqlitePool> {
    let in_memory = config.path == ":memory:";

    let options = SqliteConnectOptions::new()
        .filename(&config.path)
        .journal_mode(if in_memory {
            SqliteJournalMode::Memory
        } else {
            SqliteJournalMode::Wal
        })
        // SQLite ships with foreign keys off for backwards compatibility;
        // the loans table relies on them.
        .foreign_keys(true)
        .create_if_missing(true);

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections);

    if in_memory {
        // An in-memory database disappears with its connection.
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;

    info!(path = %config.path, "Database opened");

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}
