//! # REST API Errors
//!
//! Error types for the REST API module.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

use super::response::MappingError;

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

/// Rejection of an incoming filter parameter, raised before any store access
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Required parameter absent
    #[error("Missing required parameter: {0}")]
    Missing(&'static str),

    /// Parameter present but not parseable as the expected type
    #[error("Invalid value for {field}: expected {expected}, got '{value}'")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        value: String,
    },

    /// Parameter parsed but outside its allowed range
    #[error("Parameter {field} out of range: {value} (must be {constraint})")]
    OutOfRange {
        field: &'static str,
        value: String,
        constraint: &'static str,
    },

    /// Bounding box with min greater than max
    #[error("Invalid {axis} range: min {min} is greater than max {max}")]
    InvertedRange {
        axis: &'static str,
        min: f64,
        max: f64,
    },
}

impl ValidationError {
    /// Name of the offending parameter (or axis)
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing(field) => field,
            ValidationError::WrongType { field, .. } => field,
            ValidationError::OutOfRange { field, .. } => field,
            ValidationError::InvertedRange { axis, .. } => axis,
        }
    }
}

/// REST API errors
#[derive(Debug, Clone, Error)]
pub enum RestError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Invalid filter input
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Detail lookup miss
    #[error("Organization not found")]
    NotFound,

    /// API key header absent
    #[error("Missing API key header: {0}")]
    MissingApiKey(String),

    /// API key header present but wrong
    #[error("Invalid API key")]
    InvalidApiKey,

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Store connectivity or query failure
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Stored data violated an integrity invariant
    #[error("{0}")]
    Mapping(#[from] MappingError),
}

impl RestError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            RestError::Validation(_) => StatusCode::BAD_REQUEST,

            // 401/403 from the key check
            RestError::MissingApiKey(_) => StatusCode::UNAUTHORIZED,
            RestError::InvalidApiKey => StatusCode::FORBIDDEN,

            // 404 Not Found
            RestError::NotFound => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            RestError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::Mapping(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to a client
    fn public_message(&self) -> String {
        match self {
            RestError::Store(_) => "Internal error: store unavailable".to_string(),
            RestError::Mapping(_) => "Internal error: inconsistent data".to_string(),
            other => other.to_string(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<RestError> for ErrorResponse {
    fn from(err: RestError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.public_message(),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RestError::from(ValidationError::Missing("radius")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(RestError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            RestError::MissingApiKey("X-API-KEY".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(RestError::InvalidApiKey.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            RestError::from(StoreError::Unavailable("refused".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_details_are_not_exposed() {
        let err = RestError::from(StoreError::Query("relation \"x\" does not exist".to_string()));
        let body = ErrorResponse::from(err);
        assert_eq!(body.code, 500);
        assert!(!body.error.contains("relation"));
    }

    #[test]
    fn test_validation_message_names_field() {
        let err = ValidationError::OutOfRange {
            field: "latitude",
            value: "91".to_string(),
            constraint: "between -90 and 90",
        };
        assert_eq!(err.field(), "latitude");
        let body = ErrorResponse::from(RestError::from(err));
        assert!(body.error.contains("latitude"));
        assert!(body.error.contains("between -90 and 90"));
    }
}
