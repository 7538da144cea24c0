//! In-memory storage backend
//!
//! Default storage implementation using in-memory hashmaps.
//! Suitable for development and single-instance deployments.
//! Data is lost on restart.

use async_trait::async_trait;
use pks_core::{EndpointRecord, PresentedCertificate};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;
use uuid::Uuid;

use super::{EndpointStore, StorageError, TrustedCertificate};

/// In-memory endpoint store implementation
#[derive(Debug)]
pub struct MemoryStore {
    endpoints: RwLock<HashMap<Uuid, EndpointRecord>>,
    certificates: RwLock<HashMap<String, TrustedCertificate>>,
}

impl MemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            endpoints: RwLock::new(HashMap::new()),
            certificates: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StorageError> {
    lock.read()
        .map_err(|_| StorageError::Database("store lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StorageError> {
    lock.write()
        .map_err(|_| StorageError::Database("store lock poisoned".into()))
}

/// Find a record other than `exclude` sharing the partition and address pair
fn conflicting<'a>(
    endpoints: &'a HashMap<Uuid, EndpointRecord>,
    record: &EndpointRecord,
    exclude: Option<Uuid>,
) -> Option<&'a EndpointRecord> {
    let partition = record.scope().partition_key();
    endpoints.values().find(|existing| {
        Some(existing.id) != exclude
            && existing.has_addresses(&record.api_address, &record.auth_address)
            && existing.scope().partition_key() == partition
    })
}

#[async_trait]
impl EndpointStore for MemoryStore {
    // =========================================================================
    // Endpoint Records
    // =========================================================================

    async fn create_endpoint(&self, record: EndpointRecord) -> Result<(), StorageError> {
        let mut endpoints = write(&self.endpoints)?;

        if endpoints.contains_key(&record.id) {
            return Err(StorageError::AlreadyExists(record.id.to_string()));
        }
        if let Some(existing) = conflicting(&endpoints, &record, None) {
            return Err(StorageError::AlreadyExists(existing.id.to_string()));
        }

        info!(
            id = %record.id,
            api_address = %record.api_address,
            auth_address = %record.auth_address,
            "Storing endpoint"
        );
        endpoints.insert(record.id, record);
        Ok(())
    }

    async fn update_endpoint(&self, record: EndpointRecord) -> Result<(), StorageError> {
        let mut endpoints = write(&self.endpoints)?;

        if !endpoints.contains_key(&record.id) {
            return Err(StorageError::NotFound(record.id.to_string()));
        }
        if let Some(existing) = conflicting(&endpoints, &record, Some(record.id)) {
            return Err(StorageError::AlreadyExists(existing.id.to_string()));
        }

        info!(id = %record.id, "Replacing endpoint");
        endpoints.insert(record.id, record);
        Ok(())
    }

    async fn get_endpoint(&self, id: Uuid) -> Result<Option<EndpointRecord>, StorageError> {
        let endpoints = read(&self.endpoints)?;
        Ok(endpoints.get(&id).cloned())
    }

    async fn find_by_addresses(
        &self,
        partition_key: &str,
        api_address: &str,
        auth_address: &str,
    ) -> Result<Vec<EndpointRecord>, StorageError> {
        let endpoints = read(&self.endpoints)?;
        Ok(endpoints
            .values()
            .filter(|e| e.has_addresses(api_address, auth_address))
            .filter(|e| e.scope().partition_key() == partition_key)
            .cloned()
            .collect())
    }

    async fn list_endpoints(&self) -> Result<Vec<EndpointRecord>, StorageError> {
        let endpoints = read(&self.endpoints)?;
        let mut records: Vec<EndpointRecord> = endpoints.values().cloned().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn delete_endpoint(&self, id: Uuid) -> Result<bool, StorageError> {
        let mut endpoints = write(&self.endpoints)?;
        let removed = endpoints.remove(&id).is_some();
        if removed {
            info!(id = %id, "Removed endpoint");
        }
        Ok(removed)
    }

    // =========================================================================
    // Trusted Certificates
    // =========================================================================

    async fn trust_certificate(
        &self,
        certificate: PresentedCertificate,
    ) -> Result<String, StorageError> {
        let trusted = TrustedCertificate::accept(certificate);
        let link = trusted.link.clone();

        let mut certificates = write(&self.certificates)?;
        info!(
            link = %link,
            subject = ?trusted.certificate.subject,
            "Trusting certificate"
        );
        certificates.insert(link.clone(), trusted);
        Ok(link)
    }

    async fn get_trusted_certificate(
        &self,
        link: &str,
    ) -> Result<Option<TrustedCertificate>, StorageError> {
        let certificates = read(&self.certificates)?;
        Ok(certificates.get(link).cloned())
    }
}
