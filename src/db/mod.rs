//! Persistence gateway.
//!
//! Owns the single connection pool to the feedback database. The pool is
//! opened on first use and shared by every request afterwards.

mod collection;

pub use collection::*;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use tokio::sync::OnceCell;

use crate::config::DatabaseConfig;
use crate::errors::AppError;

/// Lazily connected handle to the feedback database.
pub struct Gateway {
    config: DatabaseConfig,
    pool: OnceCell<SqlitePool>,
    index_ready: OnceCell<()>,
}

impl Gateway {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            pool: OnceCell::new(),
            index_ready: OnceCell::new(),
        }
    }

    /// Get the feedback collection, connecting on the first call.
    pub async fn collection(&self) -> Result<FeedbackCollection<'_>, AppError> {
        let pool = self
            .pool
            .get_or_try_init(|| connect(&self.config))
            .await?;

        Ok(FeedbackCollection::new(pool, &self.index_ready))
    }

    /// Whether the pool has been opened yet.
    pub fn is_connected(&self) -> bool {
        self.pool.initialized()
    }
}

/// Open the connection pool and create the schema.
async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let path = config.file_path();
    tracing::info!("Connecting to feedback database at {:?}", path);

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(config.connect_timeout)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Create the feedback table if it doesn't exist.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // `seq` is never reused and orders entries sharing a timestamp.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feedback (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            topic_key TEXT NOT NULL,
            author_name TEXT NOT NULL,
            message TEXT NOT NULL,
            contact_email TEXT,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
