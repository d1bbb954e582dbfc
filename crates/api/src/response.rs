//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use heatmap_core::{ClickHeatmapResult, HeatmapPage, QueryErrorCode, ValidationErrorCode};
use serde::{Deserialize, Serialize};

/// Click heatmap response, echoing the requested pathname.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClickHeatmapResponse {
    pub data: ClickHeatmapResult,
    pub pathname: String,
}

/// Page ranking response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HeatmapPagesResponse {
    pub data: Vec<HeatmapPage>,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub clickhouse_connected: bool,
    pub in_flight_queries: u64,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}

/// API error type with error codes.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
        }
    }

    pub fn missing_field(field: &str) -> Self {
        Self::with_code(
            StatusCode::BAD_REQUEST,
            ValidationErrorCode::MissingField.code(),
            format!("{} is required", field),
        )
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_code(
            StatusCode::BAD_REQUEST,
            ValidationErrorCode::InvalidParameter.code(),
            msg,
        )
    }

    pub fn validation(errors: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            response: ErrorResponse::new(
                "Validation failed",
                ValidationErrorCode::InvalidParameter.code(),
            )
            .with_details(errors),
        }
    }

    /// Opaque server-side failure. `msg` is shown to the caller verbatim, so
    /// it must never carry store diagnostics.
    pub fn aggregation_failed(msg: impl Into<String>) -> Self {
        Self::with_code(
            StatusCode::INTERNAL_SERVER_ERROR,
            QueryErrorCode::AggregationFailed.code(),
            msg,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

/// Map an engine error to a response.
///
/// Validation errors carry messages written by this service and are passed
/// through. Everything else becomes `public_message`.
pub fn engine_error(err: heatmap_core::Error, public_message: &str) -> ApiError {
    match err {
        heatmap_core::Error::ValidationWithCode {
            code,
            message,
            http_status,
        } => {
            let status = StatusCode::from_u16(http_status).unwrap_or(StatusCode::BAD_REQUEST);
            ApiError::with_code(status, code, message)
        }
        _ => ApiError::aggregation_failed(public_message),
    }
}
