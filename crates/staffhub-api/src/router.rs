//! Route definitions for the StaffHub notification API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(notification_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Event stream, producer dispatch, and connection administration
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications/stream",
            get(handlers::stream::notification_stream),
        )
        .route("/notifications/dispatch", post(handlers::dispatch::dispatch))
        .route(
            "/notifications/connections",
            get(handlers::connections::list_connections),
        )
        .route(
            "/notifications/connections/{user_id}",
            delete(handlers::connections::disconnect_user),
        )
}

/// Liveness and diagnostics
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
