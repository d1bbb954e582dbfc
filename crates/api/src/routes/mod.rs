//! API routes.

pub mod health;
pub mod heatmap;

use axum::{http::Method, routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route(
            "/sites/:site_id/heatmap/clicks",
            get(heatmap::click_heatmap_handler),
        )
        .route(
            "/sites/:site_id/heatmap/pages",
            get(heatmap::heatmap_pages_handler),
        )
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .route("/metrics", get(health::metrics_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
