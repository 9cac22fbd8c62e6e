//! Typed view over the `feedback` table.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};
use tokio::sync::OnceCell;

use crate::errors::AppError;
use crate::models::FeedbackEntry;

/// Handle to the feedback collection, borrowed from the [`super::Gateway`].
pub struct FeedbackCollection<'a> {
    pool: &'a SqlitePool,
    index_ready: &'a OnceCell<()>,
}

impl<'a> FeedbackCollection<'a> {
    pub(super) fn new(pool: &'a SqlitePool, index_ready: &'a OnceCell<()>) -> Self {
        Self { pool, index_ready }
    }

    /// Ensure the (topic_key, created_at DESC) index exists.
    ///
    /// Issued once per process; later calls return immediately.
    pub async fn ensure_index(&self) -> Result<(), AppError> {
        self.index_ready
            .get_or_try_init(|| async {
                sqlx::query(
                    "CREATE INDEX IF NOT EXISTS idx_feedback_topic_created ON feedback(topic_key ASC, created_at DESC)",
                )
                .execute(self.pool)
                .await
                .map(|_| ())
            })
            .await?;
        Ok(())
    }

    /// Insert one entry.
    pub async fn insert_one(&self, entry: &FeedbackEntry) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO feedback (id, topic_key, author_name, message, contact_email, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.topic_key)
        .bind(&entry.author_name)
        .bind(&entry.message)
        .bind(&entry.contact_email)
        .bind(format_timestamp(&entry.created_at))
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Find entries for a topic key, newest first, at most `limit` of them.
    pub async fn find_by_topic(
        &self,
        topic_key: &str,
        limit: usize,
    ) -> Result<Vec<FeedbackEntry>, AppError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            "SELECT id, topic_key, author_name, message, contact_email, created_at FROM feedback WHERE topic_key = ? ORDER BY created_at DESC, seq DESC LIMIT ?",
        )
        .bind(topic_key)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(entry_from_row).collect()
    }

    /// Delete one entry by id. Returns whether a row was removed.
    pub async fn delete_one(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM feedback WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count entries for a topic key.
    pub async fn count_by_topic(&self, topic_key: &str) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM feedback WHERE topic_key = ?")
            .bind(topic_key)
            .fetch_one(self.pool)
            .await?;
        Ok(row.get("n"))
    }
}

/// Fixed-width UTC timestamp, so text order matches time order.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn entry_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<FeedbackEntry, AppError> {
    let created_at: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| AppError::Internal(format!("Corrupt timestamp {}: {}", created_at, e)))?
        .with_timezone(&Utc);

    Ok(FeedbackEntry {
        id: row.get("id"),
        topic_key: row.get("topic_key"),
        author_name: row.get("author_name"),
        message: row.get("message"),
        contact_email: row.get("contact_email"),
        created_at,
    })
}
