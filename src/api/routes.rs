use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_context_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Browse
        .route("/browse", get(handlers::browse))
        // Playback
        .route("/watch/:id", get(handlers::watch))
        .route("/watch/:id/events", post(handlers::movie_event))
        .route("/watch/:id/episode/:index", get(handlers::watch_episode))
        .route(
            "/watch/:id/episode/:index/events",
            post(handlers::episode_event),
        )
        // Series
        .route("/series/:id", get(handlers::series_detail))
        // Admin analytics
        .route("/admin/analytics/charts", get(handlers::analytics_charts))
        // Request context first, so the request id is in place before the trace span opens
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_context_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
