//! API error types and responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pks_core::RegistrationError;
use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Registration(RegistrationError),
}

/// API error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, Option<serde_json::Value>) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", None),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", None),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", None),
            ApiError::Registration(err) => {
                let (code, details) = registration_code(err);
                (registration_status(err), code, details)
            }
        }
    }
}

fn registration_status(err: &RegistrationError) -> StatusCode {
    match err {
        RegistrationError::NotFound(_) => StatusCode::NOT_FOUND,
        RegistrationError::UnavailableBackend { .. } => StatusCode::SERVICE_UNAVAILABLE,
        err if err.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn registration_code(err: &RegistrationError) -> (&'static str, Option<serde_json::Value>) {
    match err {
        RegistrationError::MissingBody => ("MISSING_BODY", None),
        RegistrationError::InvalidScheme(scheme) => (
            "INVALID_SCHEME",
            Some(serde_json::json!({ "scheme": scheme })),
        ),
        RegistrationError::InvalidHostAddress(address) => (
            "INVALID_HOST_ADDRESS",
            Some(serde_json::json!({ "address": address })),
        ),
        RegistrationError::DuplicateEndpoint {
            api_address,
            auth_address,
        } => (
            "DUPLICATE_ENDPOINT",
            Some(serde_json::json!({
                "apiAddress": api_address,
                "authAddress": auth_address,
            })),
        ),
        RegistrationError::MissingField(_) => ("MISSING_FIELD", None),
        RegistrationError::NotFound(_) => ("NOT_FOUND", None),
        RegistrationError::UnavailableBackend { path, .. } => (
            "UNAVAILABLE_BACKEND",
            Some(serde_json::json!({ "path": path })),
        ),
        RegistrationError::Storage(_) => ("STORAGE_ERROR", None),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, details) = self.parts();

        // Registration failures are returned with their text verbatim
        let message = match &self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Internal(msg) => {
                msg.clone()
            }
            ApiError::Registration(err) => err.to_string(),
        };

        let body = ErrorResponse {
            message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        ApiError::Registration(err)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(id) => ApiError::NotFound(format!("Endpoint not found: {}", id)),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
