//! Endpoint registration orchestrator
//!
//! A registration moves through these stages, stopping at the first failure:
//!
//! ```text
//! Received -> Validated -> ScopeResolved -> UniquenessChecked -> [Confirmed] -> Persisted
//! ```
//!
//! Updates locate the existing record before the uniqueness check and exclude
//! it from that check. When the caller has not acknowledged the host address,
//! the live connectivity check runs before anything is written, and a
//! certificate presented by the target must be accepted before the record
//! is persisted. The accepted certificate is trusted after the record write.

use pks_core::{
    store_cert_link, validate_endpoint_addresses, ConfirmationState, EndpointDescriptor,
    EndpointRecord, PresentedCertificate, Registration, RegistrationCommand, RegistrationError,
    RegistrationRequest, ValidatedAddresses, TRUST_CERT_LINK_PROPERTY,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::adapters::{AdapterRegistry, ConnectivityReport};
use crate::core::uniqueness::UniquenessChecker;
use crate::storage::{trust_cert_link, EndpointStore, StorageError};

/// Result of a registration request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Record persisted; `created` is false for updates
    Registered { record: EndpointRecord, created: bool },
    /// Target presented a certificate the caller has not accepted yet
    CertificateConfirmationRequired(PresentedCertificate),
}

/// Record a registration writes to
enum Target {
    New(EndpointDescriptor),
    Existing {
        previous: EndpointRecord,
        endpoint: EndpointDescriptor,
    },
}

impl Target {
    fn endpoint(&self) -> &EndpointDescriptor {
        match self {
            Target::New(endpoint) | Target::Existing { endpoint, .. } => endpoint,
        }
    }

    fn endpoint_mut(&mut self) -> &mut EndpointDescriptor {
        match self {
            Target::New(endpoint) | Target::Existing { endpoint, .. } => endpoint,
        }
    }

    fn existing_id(&self) -> Option<Uuid> {
        match self {
            Target::New(_) => None,
            Target::Existing { previous, .. } => Some(previous.id),
        }
    }
}

/// Sequences validation, scoping, uniqueness and persistence of endpoints
#[derive(Debug, Clone)]
pub struct EndpointRegistrar {
    store: Arc<dyn EndpointStore>,
    adapters: Arc<AdapterRegistry>,
    adapter_path: String,
    connect_timeout: Duration,
}

impl EndpointRegistrar {
    pub fn new(
        store: Arc<dyn EndpointStore>,
        adapters: Arc<AdapterRegistry>,
        adapter_path: impl Into<String>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            store,
            adapters,
            adapter_path: adapter_path.into(),
            connect_timeout,
        }
    }

    /// Register (create or update) an endpoint
    pub async fn register(
        &self,
        request: Option<RegistrationRequest>,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        let RegistrationCommand {
            registration,
            confirmation,
        } = request.ok_or(RegistrationError::MissingBody)?.into_command()?;

        let addresses = validate_endpoint_addresses(registration.endpoint())?;
        let scope = registration.endpoint().scope();

        let mut target = match registration {
            Registration::Create(endpoint) => Target::New(endpoint),
            Registration::Update { id, endpoint } => Target::Existing {
                previous: self
                    .store
                    .get_endpoint(id)
                    .await
                    .map_err(storage_error)?
                    .ok_or_else(|| RegistrationError::NotFound(id.to_string()))?,
                endpoint,
            },
        };

        let endpoint = target.endpoint();
        UniquenessChecker::new(self.store.as_ref())
            .check(
                &scope,
                &endpoint.api_address,
                &endpoint.auth_address,
                target.existing_id(),
            )
            .await?;

        let mut certificate = None;
        if let ConfirmationState::PendingConfirmation { accept_certificate } = confirmation {
            if let Some(presented) = self.check_connectivity(&addresses).await?.certificate {
                if !accept_certificate {
                    info!(
                        fingerprint = %presented.fingerprint,
                        "Certificate acceptance required before registration"
                    );
                    return Ok(RegistrationOutcome::CertificateConfirmationRequired(presented));
                }

                store_cert_link(
                    target.endpoint_mut(),
                    TRUST_CERT_LINK_PROPERTY,
                    trust_cert_link(&presented.fingerprint),
                );
                certificate = Some(presented);
            }
        }

        // The certificate is trusted only once the record is stored, and the
        // record write is undone if trusting fails.
        match target {
            Target::New(endpoint) => {
                let record = EndpointRecord::create(Uuid::new_v4(), endpoint);
                self.store
                    .create_endpoint(record.clone())
                    .await
                    .map_err(|e| persist_error(e, &record))?;

                if let Err(err) = self.trust(certificate).await {
                    if let Err(undo) = self.store.delete_endpoint(record.id).await {
                        error!(id = %record.id, error = %undo, "Failed to remove untrusted endpoint");
                    }
                    return Err(storage_error(err));
                }

                info!(
                    id = %record.id,
                    scope = %scope,
                    api_address = %record.api_address,
                    auth_address = %record.auth_address,
                    "Registered endpoint"
                );
                Ok(RegistrationOutcome::Registered {
                    record,
                    created: true,
                })
            }
            Target::Existing { previous, endpoint } => {
                let mut record = previous.clone();
                record.apply(endpoint);
                self.store
                    .update_endpoint(record.clone())
                    .await
                    .map_err(|e| persist_error(e, &record))?;

                if let Err(err) = self.trust(certificate).await {
                    if let Err(undo) = self.store.update_endpoint(previous).await {
                        error!(id = %record.id, error = %undo, "Failed to restore endpoint");
                    }
                    return Err(storage_error(err));
                }

                info!(
                    id = %record.id,
                    scope = %scope,
                    auth_address = %record.auth_address,
                    "Updated endpoint"
                );
                Ok(RegistrationOutcome::Registered {
                    record,
                    created: false,
                })
            }
        }
    }

    async fn trust(&self, certificate: Option<PresentedCertificate>) -> Result<(), StorageError> {
        if let Some(certificate) = certificate {
            let link = self.store.trust_certificate(certificate).await?;
            info!(link = %link, "Trusted certificate");
        }
        Ok(())
    }

    /// Check connectivity to an endpoint without persisting anything
    pub async fn validate_connection(
        &self,
        request: Option<RegistrationRequest>,
    ) -> Result<ConnectivityReport, RegistrationError> {
        let request = request.ok_or(RegistrationError::MissingBody)?;
        let addresses = validate_endpoint_addresses(request.endpoint()?)?;
        self.check_connectivity(&addresses).await
    }

    /// Delegate to the adapter registered at the adapter path
    async fn check_connectivity(
        &self,
        addresses: &ValidatedAddresses,
    ) -> Result<ConnectivityReport, RegistrationError> {
        let unavailable = |reason: String| RegistrationError::UnavailableBackend {
            reason,
            path: self.adapter_path.clone(),
        };

        let checker = self.adapters.get(&self.adapter_path).ok_or_else(|| {
            warn!(path = %self.adapter_path, "No connectivity adapter registered");
            unavailable("Service not found".to_string())
        })?;

        match tokio::time::timeout(self.connect_timeout, checker.check(addresses)).await {
            Ok(Ok(report)) => {
                info!(
                    api_address = %addresses.api,
                    auth_address = %addresses.auth,
                    certificate = report.certificate.is_some(),
                    "Endpoint reachable"
                );
                Ok(report)
            }
            Ok(Err(e)) => {
                warn!(path = %self.adapter_path, error = %e, "Connectivity check failed");
                Err(unavailable(e.to_string()))
            }
            Err(_) => {
                warn!(
                    path = %self.adapter_path,
                    timeout_ms = self.connect_timeout.as_millis() as u64,
                    "Connectivity check timed out"
                );
                Err(unavailable(format!(
                    "Timed out after {}ms",
                    self.connect_timeout.as_millis()
                )))
            }
        }
    }
}

fn storage_error(err: StorageError) -> RegistrationError {
    match err {
        StorageError::NotFound(id) => RegistrationError::NotFound(id),
        other => RegistrationError::Storage(other.to_string()),
    }
}

/// Map a persistence failure; a lost uniqueness race becomes a duplicate
fn persist_error(err: StorageError, record: &EndpointRecord) -> RegistrationError {
    match err {
        StorageError::AlreadyExists(existing) => {
            warn!(
                id = %record.id,
                existing = %existing,
                "Endpoint rejected by store as duplicate"
            );
            RegistrationError::DuplicateEndpoint {
                api_address: record.api_address.clone(),
                auth_address: record.auth_address.clone(),
            }
        }
        other => storage_error(other),
    }
}
