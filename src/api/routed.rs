//! Routed binding: one handler per method and path.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::{delete, get},
    Router,
};

use super::{delete_entry, json, list_entries, submit_entry, FEEDBACK_ALLOW, FEEDBACK_ITEM_ALLOW};
use crate::errors::AppError;
use crate::AppState;

/// Feedback routes for the routed binding, relative to `/api`.
pub fn routed_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/feedback",
            get(list_feedback)
                .post(create_feedback)
                .fallback(feedback_method_not_allowed),
        )
        .route(
            "/feedback/{id}",
            delete(delete_feedback).fallback(feedback_item_method_not_allowed),
        )
}

/// GET /api/feedback?topicKey= - List entries for a topic, newest first.
pub async fn list_feedback(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let entries = list_entries(&state, &query).await?;
    Ok(json(StatusCode::OK, &entries))
}

/// POST /api/feedback - Submit a new entry.
pub async fn create_feedback(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let body = body?;
    let (status, ack) = submit_entry(&state, &body).await?;
    Ok(json(status, &ack))
}

/// DELETE /api/feedback/{id} - Remove an entry (admin).
pub async fn delete_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let ack = delete_entry(&state, &headers, &id).await?;
    Ok(json(StatusCode::OK, &ack))
}

async fn feedback_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed(FEEDBACK_ALLOW)
}

async fn feedback_item_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed(FEEDBACK_ITEM_ALLOW)
}
