//! Feedback store: the domain operations behind both transport bindings.

use std::sync::Arc;

use chrono::{SubsecRound, Utc};

use crate::db::Gateway;
use crate::errors::AppError;
use crate::models::{FeedbackEntry, ValidatedSubmission};

/// Result of a create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new entry was written with this id.
    Created(String),
    /// The honeypot was tripped; nothing was written.
    SpamSuppressed,
}

/// Append-only feedback store.
#[derive(Clone)]
pub struct FeedbackStore {
    gateway: Arc<Gateway>,
}

impl FeedbackStore {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Store a validated submission, unless it is spam.
    pub async fn create(&self, submission: ValidatedSubmission) -> Result<CreateOutcome, AppError> {
        if submission.honeypot_tripped {
            tracing::info!(topic_key = %submission.topic_key, "honeypot tripped, submission dropped");
            return Ok(CreateOutcome::SpamSuppressed);
        }

        let entry = FeedbackEntry {
            id: uuid::Uuid::new_v4().to_string(),
            topic_key: submission.topic_key,
            author_name: submission.author_name,
            message: submission.message,
            contact_email: submission.contact_email,
            // Stored at microsecond precision.
            created_at: Utc::now().trunc_subsecs(6),
        };

        self.gateway.collection().await?.insert_one(&entry).await?;
        tracing::debug!(id = %entry.id, topic_key = %entry.topic_key, "feedback created");

        Ok(CreateOutcome::Created(entry.id))
    }

    /// List entries for a topic key, newest first, capped at `limit`.
    pub async fn list(&self, topic_key: &str, limit: usize) -> Result<Vec<FeedbackEntry>, AppError> {
        if topic_key.is_empty() {
            return Err(AppError::BadRequest("Missing topicKey".to_string()));
        }

        let collection = self.gateway.collection().await?;
        collection.ensure_index().await?;
        collection.find_by_topic(topic_key, limit).await
    }

    /// Administrative hard delete.
    pub async fn remove(&self, id: &str) -> Result<(), AppError> {
        let removed = self.gateway.collection().await?.delete_one(id).await?;
        if !removed {
            return Err(AppError::NotFound(format!("Feedback {} not found", id)));
        }
        tracing::info!(id = %id, "feedback deleted");
        Ok(())
    }

    /// Number of stored entries for a topic key.
    pub async fn count(&self, topic_key: &str) -> Result<i64, AppError> {
        self.gateway.collection().await?.count_by_topic(topic_key).await
    }
}
