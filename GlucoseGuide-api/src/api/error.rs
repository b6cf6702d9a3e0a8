use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use glucose_guide_domain::services::{MeasurementServiceError, UserServiceError};

/// Error response format for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a not found error response
    pub fn not_found(message: &str) -> Self {
        Self {
            error: "not_found".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create a bad request error response with a specific code
    pub fn bad_request(code: &str, message: &str) -> Self {
        Self {
            error: code.to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create a conflict error response
    pub fn conflict(message: &str) -> Self {
        Self {
            error: "conflict".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
            details: None,
        }
    }
}

/// Errors returned by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidFormat(String),

    #[error("{0}")]
    InvalidRange(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Storage(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidFormat(_) | ApiError::InvalidRange(_) | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MeasurementServiceError> for ApiError {
    fn from(err: MeasurementServiceError) -> Self {
        match err {
            MeasurementServiceError::NotFound(msg) => ApiError::NotFound(msg),
            MeasurementServiceError::InvalidFormat(msg) => ApiError::InvalidFormat(msg),
            MeasurementServiceError::InvalidRange(msg) => ApiError::InvalidRange(msg),
            MeasurementServiceError::Validation(msg) => ApiError::Validation(msg),
            MeasurementServiceError::Storage(msg) => ApiError::Storage(msg),
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::NotFound(id) => ApiError::NotFound(format!("User not found: {}", id)),
            UserServiceError::AlreadyExists(id) => {
                ApiError::Conflict(format!("User already exists: {}", id))
            }
            UserServiceError::Validation(msg) => ApiError::Validation(msg),
            UserServiceError::Storage(msg) => ApiError::Storage(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidFormat(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidFormat(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::NotFound(msg) => ErrorResponse::not_found(msg),
            ApiError::InvalidFormat(msg) => ErrorResponse::bad_request("invalid_format", msg),
            ApiError::InvalidRange(msg) => ErrorResponse::bad_request("invalid_range", msg),
            ApiError::Validation(msg) => ErrorResponse::bad_request("validation_error", msg),
            ApiError::Conflict(msg) => ErrorResponse::conflict(msg),
            ApiError::Storage(msg) => {
                error!("Storage failure: {}", msg);
                ErrorResponse::internal_error()
            }
        };

        if status.is_client_error() {
            warn!("Request rejected ({}): {}", status, body.message);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let cases = [
            (MeasurementServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (MeasurementServiceError::InvalidFormat("x".into()), StatusCode::BAD_REQUEST),
            (MeasurementServiceError::InvalidRange("x".into()), StatusCode::BAD_REQUEST),
            (MeasurementServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (MeasurementServiceError::Storage("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_user_errors_map_to_status_codes() {
        let cases = [
            (UserServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (UserServiceError::AlreadyExists("x".into()), StatusCode::CONFLICT),
            (UserServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (UserServiceError::Storage("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn test_storage_details_are_not_leaked() {
        let response = ApiError::Storage("disk I/O error at /var/db".into()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(body.error, "internal_error");
        assert!(!body.message.contains("/var/db"));
    }
}
