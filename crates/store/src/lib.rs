pub mod docs;
pub mod map;
pub mod migrate;
pub mod repo;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Store outage or query failure; retrying is the caller's call.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A stored document carries a `contentType` outside the two known
    /// variants. Data-integrity failure, fatal for the fetch that hit it.
    #[error("document {id} has unknown contentType {value:?}")]
    UnknownContentType { id: String, value: String },

    /// A stored document no longer deserializes into its entity shape.
    #[error("document {id} is malformed: {source}")]
    Malformed {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Create a SQLite connection pool with WAL mode enabled.
pub async fn connect(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    // Ensure parent directory exists
    if let Some(parent) = Path::new(db_path).parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let opts = SqliteConnectOptions::from_str(db_path)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;

    Ok(pool)
}
