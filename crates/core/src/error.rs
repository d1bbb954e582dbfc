//! Unified error types for the heatmap engine.
//!
//! Error codes:
//! - VALID_001-002: Validation errors
//! - QUERY_001: Aggregation / store errors

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// VALID_001: Required parameter is missing
    MissingField,
    /// VALID_002: Parameter present but malformed or out of range
    InvalidParameter,
}

impl ValidationErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField => "VALID_001",
            Self::InvalidParameter => "VALID_002",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        400
    }
}

/// Query error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// QUERY_001: Aggregation could not be computed
    AggregationFailed,
}

impl QueryErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AggregationFailed => "QUERY_001",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        500
    }
}

/// Unified error type for the heatmap engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Validation error with code.
    #[error("[{code}] {message}")]
    ValidationWithCode {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// A store query failed. Carries the store's own diagnostic text and must
    /// not be shown to API callers.
    #[error("query error: {0}")]
    Query(String),

    /// An aggregation failed as a whole; wraps the underlying cause.
    #[error("[{code}] {operation} failed: {source}")]
    Aggregation {
        code: &'static str,
        operation: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error with code.
    pub fn validation_code(code: ValidationErrorCode, msg: impl Into<String>) -> Self {
        Self::ValidationWithCode {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::validation_code(
            ValidationErrorCode::MissingField,
            format!("{} is required", field.into()),
        )
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::validation_code(ValidationErrorCode::InvalidParameter, msg)
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Wrap a failure of a whole aggregation.
    pub fn aggregation(operation: &'static str, source: Error) -> Self {
        Self::Aggregation {
            code: QueryErrorCode::AggregationFailed.code(),
            operation,
            source: Box::new(source),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ValidationWithCode { http_status, .. } => *http_status,
            Self::Query(_) => 500,
            Self::Aggregation { .. } => QueryErrorCode::AggregationFailed.http_status(),
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::ValidationWithCode { code, .. } => Some(code),
            Self::Aggregation { code, .. } => Some(code),
            _ => None,
        }
    }

    /// True for caller-side errors (bad input), false for server-side ones.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationWithCode { .. })
    }
}
