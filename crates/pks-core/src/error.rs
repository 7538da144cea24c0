//! Error types for endpoint registration

use thiserror::Error;

/// Result type alias using RegistrationError
pub type Result<T> = std::result::Result<T, RegistrationError>;

/// Errors that can occur while registering or validating an endpoint
///
/// The `Display` text of each variant is returned to callers verbatim, so
/// the wording is part of the public contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// Request body or its endpoint payload is absent
    #[error("Body is required")]
    MissingBody,

    /// Address scheme is neither http nor https
    #[error("Unsupported scheme, must be http or https: {0}")]
    InvalidScheme(String),

    /// Address does not carry a usable host
    #[error("Invalid host address: {0}")]
    InvalidHostAddress(String),

    /// Address pair already registered in the same scope partition
    #[error("Endpoint with api address '{api_address}' and auth address '{auth_address}' already exists in this scope")]
    DuplicateEndpoint {
        api_address: String,
        auth_address: String,
    },

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Referenced endpoint record does not exist
    #[error("Endpoint not found: {0}")]
    NotFound(String),

    /// Connectivity adapter missing, unreachable or timed out
    #[error("Unexpected error: {reason}: {path}")]
    UnavailableBackend { reason: String, path: String },

    /// Backing store failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RegistrationError {
    /// Whether the failure was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RegistrationError::MissingBody
                | RegistrationError::InvalidScheme(_)
                | RegistrationError::InvalidHostAddress(_)
                | RegistrationError::DuplicateEndpoint { .. }
                | RegistrationError::MissingField(_)
                | RegistrationError::NotFound(_)
        )
    }
}
