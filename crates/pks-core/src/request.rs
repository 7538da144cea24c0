//! Registration requests
//!
//! [`RegistrationRequest`] is the wire shape accepted by the gateway. It is
//! turned into a [`RegistrationCommand`] before any work is done, so the
//! create/update choice and the confirmation gate become explicit states
//! instead of flags.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RegistrationError, Result};
use crate::types::EndpointDescriptor;

/// Registration request body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    /// Candidate endpoint
    #[serde(default)]
    pub endpoint: Option<EndpointDescriptor>,

    /// Update the record identified by `endpoint.id` instead of creating one
    #[serde(default)]
    pub is_update_operation: bool,

    /// Caller acknowledged the host address; skips the live connectivity check
    #[serde(default)]
    pub accept_host_address: bool,

    /// Caller agrees to trust a certificate presented by the target
    #[serde(default)]
    pub accept_certificate: bool,
}

impl RegistrationRequest {
    /// Request creating the given endpoint with both confirmations given
    pub fn create(endpoint: EndpointDescriptor) -> Self {
        Self {
            endpoint: Some(endpoint),
            is_update_operation: false,
            accept_host_address: true,
            accept_certificate: true,
        }
    }

    /// Request updating the given endpoint with both confirmations given
    pub fn update(endpoint: EndpointDescriptor) -> Self {
        Self {
            is_update_operation: true,
            ..Self::create(endpoint)
        }
    }

    /// Set the host address confirmation
    pub fn with_accept_host_address(mut self, accept: bool) -> Self {
        self.accept_host_address = accept;
        self
    }

    /// Set the certificate confirmation
    pub fn with_accept_certificate(mut self, accept: bool) -> Self {
        self.accept_certificate = accept;
        self
    }

    /// Borrow the endpoint payload
    pub fn endpoint(&self) -> Result<&EndpointDescriptor> {
        self.endpoint.as_ref().ok_or(RegistrationError::MissingBody)
    }

    /// Convert into an explicit command
    pub fn into_command(self) -> Result<RegistrationCommand> {
        let endpoint = self.endpoint.ok_or(RegistrationError::MissingBody)?;

        let registration = if self.is_update_operation {
            let id = endpoint
                .id
                .ok_or_else(|| RegistrationError::MissingField("endpoint.id".into()))?;
            Registration::Update { id, endpoint }
        } else {
            Registration::Create(endpoint)
        };

        let confirmation = if self.accept_host_address {
            ConfirmationState::Confirmed
        } else {
            ConfirmationState::PendingConfirmation {
                accept_certificate: self.accept_certificate,
            }
        };

        Ok(RegistrationCommand {
            registration,
            confirmation,
        })
    }
}

/// Create or update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Create(EndpointDescriptor),
    Update {
        id: Uuid,
        endpoint: EndpointDescriptor,
    },
}

impl Registration {
    pub fn endpoint(&self) -> &EndpointDescriptor {
        match self {
            Registration::Create(endpoint) => endpoint,
            Registration::Update { endpoint, .. } => endpoint,
        }
    }
}

/// Confirmation gate ahead of persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationState {
    /// Host address not yet acknowledged; connectivity must be checked first
    PendingConfirmation { accept_certificate: bool },
    /// Ready to persist
    Confirmed,
}

/// Validated intent derived from a [`RegistrationRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationCommand {
    pub registration: Registration,
    pub confirmation: ConfirmationState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_endpoint() {
        let request = RegistrationRequest::default();
        assert_eq!(request.endpoint().unwrap_err(), RegistrationError::MissingBody);
        assert_eq!(
            request.into_command().unwrap_err().to_string(),
            "Body is required"
        );
    }

    #[test]
    fn test_create_command() {
        let endpoint = EndpointDescriptor::new("https://localhost", "https://localhost");
        let command = RegistrationRequest::create(endpoint.clone())
            .into_command()
            .unwrap();

        assert_eq!(command.registration, Registration::Create(endpoint));
        assert_eq!(command.confirmation, ConfirmationState::Confirmed);
    }

    #[test]
    fn test_update_requires_id() {
        let endpoint = EndpointDescriptor::new("https://localhost", "https://localhost");
        let err = RegistrationRequest::update(endpoint).into_command().unwrap_err();
        assert_eq!(err, RegistrationError::MissingField("endpoint.id".into()));
    }

    #[test]
    fn test_update_command() {
        let id = Uuid::new_v4();
        let endpoint = EndpointDescriptor::new("https://localhost", "https://localhost").with_id(id);
        let command = RegistrationRequest::update(endpoint).into_command().unwrap();
        assert!(matches!(
            command.registration,
            Registration::Update { id: update_id, .. } if update_id == id
        ));
    }

    #[test]
    fn test_pending_confirmation() {
        let endpoint = EndpointDescriptor::new("https://localhost", "https://localhost");
        let command = RegistrationRequest::create(endpoint)
            .with_accept_host_address(false)
            .with_accept_certificate(false)
            .into_command()
            .unwrap();

        assert_eq!(
            command.confirmation,
            ConfirmationState::PendingConfirmation {
                accept_certificate: false
            }
        );
    }

    #[test]
    fn test_wire_defaults() {
        let request: RegistrationRequest = serde_json::from_str(
            r#"{"endpoint":{"apiAddress":"https://a","authAddress":"https://b"},"isUpdateOperation":false}"#,
        )
        .unwrap();
        assert!(!request.accept_host_address);
        assert!(!request.accept_certificate);
        assert_eq!(request.endpoint().unwrap().api_address, "https://a");
    }
}
