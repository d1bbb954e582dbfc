//! Health check and metrics endpoints.

use axum::{http::StatusCode, Json};
use telemetry::{health, metrics, MetricsSnapshot};

use crate::response::HealthResponse;

/// GET /health - Full health check.
pub async fn health_handler() -> Json<HealthResponse> {
    let report = health().report();

    Json(HealthResponse {
        status: report.status.as_str().to_string(),
        clickhouse_connected: health().clickhouse.is_healthy(),
        in_flight_queries: metrics().in_flight_queries.get(),
    })
}

/// GET /health/ready - Readiness probe (store reachable).
pub async fn ready_handler() -> StatusCode {
    if health().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness probe (service is running).
pub async fn live_handler() -> StatusCode {
    if health().is_alive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /metrics - Snapshot of in-process counters.
pub async fn metrics_handler() -> Json<MetricsSnapshot> {
    Json(metrics().snapshot())
}
