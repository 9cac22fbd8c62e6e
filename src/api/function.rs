//! Function binding: a single serverless-style handler.
//!
//! [`handle`] receives the whole request as plain data and always produces
//! exactly one response; the axum routes below only adapt it to HTTP.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use serde::Serialize;

use super::{
    delete_entry, list_entries, submit_entry, FEEDBACK_ALLOW, FEEDBACK_ITEM_ALLOW,
    JSON_CONTENT_TYPE,
};
use crate::errors::{AppError, ErrorResponse};
use crate::AppState;

/// Everything the function needs to know about an inbound request.
#[derive(Debug, Clone)]
pub struct FunctionRequest {
    pub method: Method,
    /// Entry id when the path was `/feedback/{id}`
    pub id: Option<String>,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A fully rendered JSON response.
#[derive(Debug, Clone)]
pub struct FunctionResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl FunctionResponse {
    /// Build a JSON response, mirroring the status/header/body triple a
    /// serverless runtime expects.
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

        match serde_json::to_vec(body) {
            Ok(body) => Self {
                status,
                headers,
                body,
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to encode response");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    headers,
                    body: br#"{"error":"Internal Server Error"}"#.to_vec(),
                }
            }
        }
    }

    fn from_error(err: AppError) -> Self {
        err.log();
        let mut response = Self::json(err.status_code(), &ErrorResponse::new(&err));
        if let Some(allow) = err.allow() {
            response
                .headers
                .insert(header::ALLOW, HeaderValue::from_static(allow));
        }
        response
    }
}

impl IntoResponse for FunctionResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

/// Handle one feedback request.
pub async fn handle(state: &AppState, request: FunctionRequest) -> FunctionResponse {
    match dispatch(state, request).await {
        Ok(response) => response,
        Err(err) => FunctionResponse::from_error(err),
    }
}

async fn dispatch(state: &AppState, request: FunctionRequest) -> Result<FunctionResponse, AppError> {
    match (request.id.as_deref(), &request.method) {
        (None, &Method::GET) | (None, &Method::HEAD) => {
            let entries = list_entries(state, &request.query).await?;
            Ok(FunctionResponse::json(StatusCode::OK, &entries))
        }
        (None, &Method::POST) => {
            let (status, ack) = submit_entry(state, &request.body).await?;
            Ok(FunctionResponse::json(status, &ack))
        }
        (None, _) => Err(AppError::MethodNotAllowed(FEEDBACK_ALLOW)),
        (Some(id), &Method::DELETE) => {
            let ack = delete_entry(state, &request.headers, id).await?;
            Ok(FunctionResponse::json(StatusCode::OK, &ack))
        }
        (Some(_), _) => Err(AppError::MethodNotAllowed(FEEDBACK_ITEM_ALLOW)),
    }
}

/// Feedback routes for the function binding, relative to `/api`.
pub fn function_routes() -> Router<AppState> {
    Router::new()
        .route("/feedback", any(feedback_function))
        .route("/feedback/{id}", any(feedback_item_function))
}

async fn feedback_function(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> FunctionResponse {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return FunctionResponse::from_error(rejection.into()),
    };
    let request = FunctionRequest {
        method,
        id: None,
        query,
        headers,
        body,
    };
    handle(&state, request).await
}

async fn feedback_item_function(
    State(state): State<AppState>,
    Path(id): Path<String>,
    method: Method,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> FunctionResponse {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return FunctionResponse::from_error(rejection.into()),
    };
    let request = FunctionRequest {
        method,
        id: Some(id),
        query: Vec::new(),
        headers,
        body,
    };
    handle(&state, request).await
}
