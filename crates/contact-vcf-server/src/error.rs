//! Error types for the contact service.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contact_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Phone number already submitted: {0}")]
    DuplicatePhone(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::InvalidPhone(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicatePhone(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::InvalidPhone(_) => "INVALID_PHONE",
            ApiError::DuplicatePhone(_) => "DUPLICATE_PHONE",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Storage(_) => "STORAGE_ERROR",
            ApiError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub message: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Storage details stay in the logs.
        let message = match &self {
            ApiError::Storage(detail) => {
                tracing::error!(error = %detail, "Storage failure");
                "Could not access contact storage".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            ok: false,
            message,
            code: self.code().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            StoreError::InvalidPhone(phone) => ApiError::InvalidPhone(phone),
            StoreError::DuplicatePhone(phone) => ApiError::DuplicatePhone(phone),
            StoreError::NotFound(what) => {
                ApiError::NotFound(format!("Contact not found: {}", what))
            }
            StoreError::Storage(msg) => ApiError::Storage(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}
