//! Seed a development database with a small demo catalog.
//!
//! ```bash
//! cargo run --bin seed
//! DATABASE_PATH=./demo.db cargo run --bin seed
//! ```

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use biblios::{
    models::{Book, Reader},
    AppConfig, AppError, Library,
};

const BOOKS: &[(&str, &str, &str, i32)] = &[
    ("978-0441172719", "Dune", "Frank Herbert", 1965),
    ("978-0553293357", "Foundation", "Isaac Asimov", 1951),
    ("978-1451673319", "Fahrenheit 451", "Ray Bradbury", 1953),
    ("978-0061120084", "To Kill a Mockingbird", "Harper Lee", 1960),
    ("978-0451524935", "1984", "George Orwell", 1949),
    ("978-0141439518", "Pride and Prejudice", "Jane Austen", 1813),
    ("978-0679783268", "Crime and Punishment", "Fyodor Dostoevsky", 1866),
    ("978-0140449136", "Anna Karenina", "Leo Tolstoy", 1877),
];

const READERS: &[(&str, &str)] = &[
    ("R1", "Alice Martin"),
    ("R2", "Boris Ivanov"),
    ("R3", "Chiara Russo"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("biblios={}", config.logging.level).into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(path = %config.database.path, "Seeding library database");

    let library = Library::open(&config.database)
        .await
        .context("Failed to open database")?;

    let mut added = 0usize;
    for &(isbn, title, author, year) in BOOKS {
        match library
            .services
            .catalog
            .add_book(Book::new(isbn, title, author, year))
            .await
        {
            Ok(()) => added += 1,
            Err(AppError::DuplicateKey(_)) => {
                tracing::debug!(isbn, "Already in catalog, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    for &(id, name) in READERS {
        match library.services.readers.register(Reader::new(id, name)).await {
            Ok(()) | Err(AppError::DuplicateKey(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    let catalog = library.services.catalog.books().await?;
    let readers = library.services.readers.readers_with_loans().await?;
    tracing::info!(
        added,
        books = catalog.len(),
        readers = readers.len(),
        "Seed complete"
    );

    library.close().await;
    Ok(())
}
