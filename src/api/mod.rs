//! REST API module.
//!
//! Two transport bindings serve the same feedback contract: `routed` maps
//! each method to its own handler, `function` is a single handler that
//! dispatches on the method itself. Both delegate to the operations here.

mod function;
mod routed;

pub use function::*;
pub use routed::*;

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;

use crate::auth::authorize_admin;
use crate::errors::AppError;
use crate::models::{Ack, FeedbackEntry, HealthResponse, DEFAULT_LIST_LIMIT};
use crate::store::CreateOutcome;
use crate::validation::{parse_submission, validate};
use crate::AppState;

/// Methods served on `/api/feedback`.
pub const FEEDBACK_ALLOW: &str = "GET, POST";
/// Methods served on `/api/feedback/{id}`.
pub const FEEDBACK_ITEM_ALLOW: &str = "DELETE";

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Largest request body accepted. A maximal submission is a few KiB even
/// with every character `\u`-escaped.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Serialize `body` as a UTF-8 JSON response.
pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
                r#"{"error":"Internal Server Error"}"#,
            )
                .into_response()
        }
    }
}

/// Pick the topic key out of the query string; the first value wins.
pub fn topic_key_from_query(query: &[(String, String)]) -> Option<&str> {
    query
        .iter()
        .find(|(name, _)| name == "topicKey" || name == "slug")
        .map(|(_, value)| value.as_str())
        .filter(|value| !value.is_empty())
}

/// List entries for the topic key named in the query.
pub async fn list_entries(
    state: &AppState,
    query: &[(String, String)],
) -> Result<Vec<FeedbackEntry>, AppError> {
    let topic_key = topic_key_from_query(query)
        .ok_or_else(|| AppError::BadRequest("Missing topicKey".to_string()))?;
    state.store.list(topic_key, DEFAULT_LIST_LIMIT).await
}

/// Validate and store a submission body.
///
/// Returns 201 for a write and 200 when the honeypot swallowed it.
pub async fn submit_entry(state: &AppState, body: &[u8]) -> Result<(StatusCode, Ack), AppError> {
    let submission = validate(parse_submission(body)?)?;
    match state.store.create(submission).await? {
        CreateOutcome::Created(_) => Ok((StatusCode::CREATED, Ack::ok())),
        CreateOutcome::SpamSuppressed => Ok((StatusCode::OK, Ack::ok())),
    }
}

/// Delete an entry after checking the admin key.
pub async fn delete_entry(state: &AppState, headers: &HeaderMap, id: &str) -> Result<Ack, AppError> {
    authorize_admin(state.config.admin_key.as_deref(), headers)?;
    state.store.remove(id).await?;
    Ok(Ack::ok())
}

/// GET /api/health - Liveness check.
pub async fn health() -> Response {
    json(
        StatusCode::OK,
        &HealthResponse {
            ok: true,
            time: Utc::now(),
        },
    )
}

/// Turn a caught panic into the standard JSON 500.
pub fn panic_response(_err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    AppError::Internal("Internal Server Error".to_string()).into_response()
}
