//! Storage abstraction for endpoint records
//!
//! This module provides a trait-based abstraction for endpoint storage,
//! enabling both in-memory (default) and persistent (PostgreSQL) backends.
//!
//! Backends must enforce the scope uniqueness of address pairs themselves:
//! two concurrent registrations can both pass the orchestrator's query, and
//! the store decides which one wins by rejecting the other with
//! [`StorageError::AlreadyExists`].

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

use async_trait::async_trait;
use pks_core::{EndpointRecord, PresentedCertificate};
use std::fmt::Debug;
use uuid::Uuid;

/// Base path of trusted certificate links
pub const TRUST_CERTS_PATH: &str = "/config/trust-certs";

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Endpoint not found: {0}")]
    NotFound(String),

    #[error("Endpoint already exists: {0}")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// A certificate the caller agreed to trust
#[derive(Debug, Clone)]
pub struct TrustedCertificate {
    /// Link stored on endpoints referencing this certificate
    pub link: String,
    pub certificate: PresentedCertificate,
    /// When the certificate was accepted
    pub accepted_at: chrono::DateTime<chrono::Utc>,
}

impl TrustedCertificate {
    /// Build the trust record for a presented certificate
    pub fn accept(certificate: PresentedCertificate) -> Self {
        Self {
            link: trust_cert_link(&certificate.fingerprint),
            certificate,
            accepted_at: chrono::Utc::now(),
        }
    }
}

/// Link under which a certificate with the given fingerprint is trusted
pub fn trust_cert_link(fingerprint: &str) -> String {
    format!("{}/{}", TRUST_CERTS_PATH, fingerprint)
}

/// Storage backend trait for endpoint records
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait EndpointStore: Send + Sync + Debug {
    // =========================================================================
    // Endpoint Records
    // =========================================================================

    /// Persist a new record
    ///
    /// Fails with `AlreadyExists` when another record in the same scope
    /// partition carries the same address pair.
    async fn create_endpoint(&self, record: EndpointRecord) -> Result<(), StorageError>;

    /// Replace an existing record
    ///
    /// Fails with `NotFound` for an unknown id and with `AlreadyExists` when
    /// the new address pair collides with a different record.
    async fn update_endpoint(&self, record: EndpointRecord) -> Result<(), StorageError>;

    /// Get a record by id
    async fn get_endpoint(&self, id: Uuid) -> Result<Option<EndpointRecord>, StorageError>;

    /// Records of a scope partition carrying exactly this address pair
    async fn find_by_addresses(
        &self,
        partition_key: &str,
        api_address: &str,
        auth_address: &str,
    ) -> Result<Vec<EndpointRecord>, StorageError>;

    /// List all records
    async fn list_endpoints(&self) -> Result<Vec<EndpointRecord>, StorageError>;

    /// Remove a record
    async fn delete_endpoint(&self, id: Uuid) -> Result<bool, StorageError>;

    // =========================================================================
    // Trusted Certificates
    // =========================================================================

    /// Trust a certificate and return the link referencing it
    ///
    /// Trusting the same fingerprint again replaces the stored certificate
    /// and returns the same link.
    async fn trust_certificate(
        &self,
        certificate: PresentedCertificate,
    ) -> Result<String, StorageError>;

    /// Get a trusted certificate by link
    async fn get_trusted_certificate(
        &self,
        link: &str,
    ) -> Result<Option<TrustedCertificate>, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trust_cert_link() {
        assert_eq!(trust_cert_link("ab:cd"), "/config/trust-certs/ab:cd");

        let trusted = TrustedCertificate::accept(PresentedCertificate::new("ff00", "PEM"));
        assert_eq!(trusted.link, "/config/trust-certs/ff00");
    }
}
