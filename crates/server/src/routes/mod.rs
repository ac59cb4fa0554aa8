//! HTTP route handlers for the directory.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health         - Liveness check
//! GET    /health/ready   - Readiness check (database)
//!
//! # Users
//! POST   /users          - Create one user, or a batch from an array
//! GET    /users          - List users
//! GET    /users/{id}     - Fetch a user
//! PUT    /users/{id}     - Partially update a user
//! DELETE /users/{id}     - Delete a user
//! ```

pub mod health;
pub mod users;

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::from_fn,
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/{id}",
            get(users::show).put(users::update).delete(users::delete),
        )
}

/// Create the health check routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
    )
}

/// Build the complete application with middleware and state attached.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(user_routes())
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
