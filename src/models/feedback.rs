//! Feedback entry and submission models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author name stored when a visitor leaves the name blank.
pub const ANONYMOUS_AUTHOR: &str = "익명";

/// Maximum number of entries returned for one topic key.
pub const DEFAULT_LIST_LIMIT: usize = 150;

/// A persisted guestbook entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "slug")]
    pub topic_key: String,
    #[serde(alias = "name")]
    pub author_name: String,
    pub message: String,
    #[serde(default, alias = "email", skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw inbound submission, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    #[serde(alias = "slug")]
    pub topic_key: String,
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    pub message: String,
    #[serde(default, alias = "email", skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    /// Honeypot; a hidden form field humans leave empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<String>,
}

/// A submission that passed validation, normalized and ready to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub topic_key: String,
    pub author_name: String,
    pub message: String,
    pub contact_email: Option<String>,
    /// Set when the honeypot field carried a non-blank value
    pub honeypot_tripped: bool,
}

/// Generic success acknowledgment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Health check body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub time: DateTime<Utc>,
}
