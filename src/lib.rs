//! Portfolio feedback backend.
//!
//! An append-only guestbook with SQLite persistence, served over HTTP by one
//! of two interchangeable transport bindings, plus a headless client.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod store;
pub mod validation;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::{Binding, Config};
use store::FeedbackStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: FeedbackStore,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let feedback_routes = match state.config.binding {
        Binding::Routed => api::routed_routes(),
        Binding::Function => api::function_routes(),
    };

    let api_routes = Router::new()
        .route("/health", get(api::health))
        .merge(feedback_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(api::MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(api::panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
