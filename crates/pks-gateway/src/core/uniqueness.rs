//! Scope uniqueness of endpoint address pairs

use pks_core::{RegistrationError, Scope};
use tracing::warn;
use uuid::Uuid;

use crate::storage::EndpointStore;

/// Checks that no other record of a scope partition carries an address pair
pub struct UniquenessChecker<'a> {
    store: &'a dyn EndpointStore,
}

impl<'a> UniquenessChecker<'a> {
    pub fn new(store: &'a dyn EndpointStore) -> Self {
        Self { store }
    }

    /// Fail with `DuplicateEndpoint` if the pair is taken within `scope`
    ///
    /// Addresses are compared exactly. `exclude` names the record being
    /// updated so that it never conflicts with itself.
    pub async fn check(
        &self,
        scope: &Scope,
        api_address: &str,
        auth_address: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), RegistrationError> {
        let partition_key = scope.partition_key();
        let matches = self
            .store
            .find_by_addresses(&partition_key, api_address, auth_address)
            .await
            .map_err(|e| RegistrationError::Storage(e.to_string()))?;

        match matches.iter().find(|record| Some(record.id) != exclude) {
            Some(existing) => {
                warn!(
                    existing = %existing.id,
                    partition = %partition_key,
                    api_address = %api_address,
                    auth_address = %auth_address,
                    "Duplicate endpoint rejected"
                );
                Err(RegistrationError::DuplicateEndpoint {
                    api_address: api_address.to_string(),
                    auth_address: auth_address.to_string(),
                })
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use pks_core::{EndpointDescriptor, EndpointRecord};

    async fn seeded(tags: &[&str]) -> (MemoryStore, Uuid) {
        let store = MemoryStore::new();
        let record = EndpointRecord::create(
            Uuid::new_v4(),
            EndpointDescriptor::new("https://localhost", "https://localhost")
                .with_scope_tags(tags.iter().copied()),
        );
        let id = record.id;
        store.create_endpoint(record).await.unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn test_conflict_in_same_scope() {
        let (store, _) = seeded(&[]).await;
        let checker = UniquenessChecker::new(&store);

        let err = checker
            .check(&Scope::Global, "https://localhost", "https://localhost", None)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateEndpoint { .. }));
    }

    #[tokio::test]
    async fn test_other_scope_or_pair_passes() {
        let (store, _) = seeded(&["/tenants/some-tenant"]).await;
        let checker = UniquenessChecker::new(&store);

        let other_tenant = Scope::resolve(&["/tenants/another-tenant"]);
        assert!(checker
            .check(&other_tenant, "https://localhost", "https://localhost", None)
            .await
            .is_ok());

        let same_tenant = Scope::resolve(&["/tenants/some-tenant"]);
        assert!(checker
            .check(&same_tenant, "https://localhost", "https://other", None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_exact_comparison() {
        let (store, _) = seeded(&[]).await;
        let checker = UniquenessChecker::new(&store);

        // No normalization: a trailing slash is a different address
        assert!(checker
            .check(&Scope::Global, "https://localhost/", "https://localhost", None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_excludes_self() {
        let (store, id) = seeded(&[]).await;
        let checker = UniquenessChecker::new(&store);

        assert!(checker
            .check(&Scope::Global, "https://localhost", "https://localhost", Some(id))
            .await
            .is_ok());
    }
}
