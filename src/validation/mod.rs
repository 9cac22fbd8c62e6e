//! Submission validation.
//!
//! Checks and normalizes an inbound submission. Failures carry detail for
//! the server log only; callers always answer with a generic message.

use validator::Validate;

use crate::errors::AppError;
use crate::models::{SubmissionRequest, ValidatedSubmission, ANONYMOUS_AUTHOR};

/// Trimmed submission fields with their length and format rules.
#[derive(Debug, Validate)]
struct Candidate {
    #[validate(length(min = 1, max = 200))]
    topic_key: String,
    #[validate(length(min = 1, max = 40))]
    author_name: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    message: String,
    #[validate(email)]
    contact_email: Option<String>,
}

/// Decode a JSON request body into a raw submission.
///
/// Wrong types, missing required fields and malformed JSON are all
/// validation failures.
pub fn parse_submission(body: &[u8]) -> Result<SubmissionRequest, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::Validation(e.to_string()))
}

/// Validate and normalize a raw submission.
pub fn validate(raw: SubmissionRequest) -> Result<ValidatedSubmission, AppError> {
    let candidate = Candidate {
        topic_key: raw.topic_key,
        author_name: raw.author_name.map(|name| name.trim().to_string()),
        message: raw.message.trim().to_string(),
        // An empty email means "not given".
        contact_email: raw.contact_email.filter(|email| !email.is_empty()),
    };
    candidate.validate()?;

    let honeypot_tripped = raw
        .hp
        .as_deref()
        .is_some_and(|hp| !hp.trim().is_empty());

    Ok(ValidatedSubmission {
        topic_key: candidate.topic_key,
        author_name: candidate
            .author_name
            .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string()),
        message: candidate.message,
        contact_email: candidate.contact_email,
        honeypot_tripped,
    })
}
