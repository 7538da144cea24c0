//! Connectivity adapters
//!
//! The gateway never talks to a PKS control plane directly. It looks up the
//! adapter registered under an adapter path and asks it whether the
//! endpoint's addresses are reachable. A missing adapter is reported by the
//! orchestrator as an unavailable backend.

#[cfg(feature = "http-adapter")]
pub mod http;

#[cfg(feature = "http-adapter")]
pub use http::HttpConnectivityChecker;

use async_trait::async_trait;
use pks_core::{PresentedCertificate, ValidatedAddresses};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Adapter path of the PKS connectivity adapter
pub const PKS_ADAPTER_PATH: &str = "/adapters/pks-service";

/// Errors reported by a connectivity adapter
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Connection failed to {address}: {reason}")]
    Unreachable { address: String, reason: String },

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Result of a successful connectivity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityReport {
    /// Certificate presented by the target, if it is not already trusted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<PresentedCertificate>,
}

impl ConnectivityReport {
    /// Target reachable without presenting a certificate
    pub fn reachable() -> Self {
        Self { certificate: None }
    }

    /// Target reachable, presenting a certificate that needs acceptance
    pub fn with_certificate(certificate: PresentedCertificate) -> Self {
        Self {
            certificate: Some(certificate),
        }
    }
}

/// Checks that an endpoint's addresses are reachable
#[async_trait]
pub trait ConnectivityChecker: Send + Sync {
    /// Check connectivity to both addresses
    ///
    /// # Returns
    /// * `Ok(ConnectivityReport)` - Target reachable, optionally presenting a certificate
    /// * `Err(AdapterError)` - Target unreachable or misbehaving
    async fn check(&self, addresses: &ValidatedAddresses) -> Result<ConnectivityReport, AdapterError>;

    /// Get a description of this checker (for logging)
    fn description(&self) -> &str {
        "connectivity checker"
    }
}

/// Registry of connectivity adapters keyed by adapter path
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn ConnectivityChecker>>,
}

impl AdapterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under a path
    pub fn register<C: ConnectivityChecker + 'static>(&mut self, path: impl Into<String>, checker: C) {
        let path = path.into();
        info!(
            path = %path,
            description = checker.description(),
            "Registered connectivity adapter"
        );
        self.adapters.insert(path, Arc::new(checker));
    }

    /// Get the adapter registered under a path
    pub fn get(&self, path: &str) -> Option<Arc<dyn ConnectivityChecker>> {
        self.adapters.get(path).cloned()
    }

    /// Check if an adapter is registered under a path
    pub fn has_adapter(&self, path: &str) -> bool {
        self.adapters.contains_key(path)
    }

    /// List registered adapter paths
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.adapters.keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("paths", &self.paths())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysReachable;

    #[async_trait]
    impl ConnectivityChecker for AlwaysReachable {
        async fn check(
            &self,
            _addresses: &ValidatedAddresses,
        ) -> Result<ConnectivityReport, AdapterError> {
            Ok(ConnectivityReport::reachable())
        }
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = AdapterRegistry::new();
        assert!(!registry.has_adapter(PKS_ADAPTER_PATH));
        assert!(registry.get(PKS_ADAPTER_PATH).is_none());

        registry.register(PKS_ADAPTER_PATH, AlwaysReachable);
        assert!(registry.has_adapter(PKS_ADAPTER_PATH));
        assert_eq!(registry.paths(), vec![PKS_ADAPTER_PATH.to_string()]);
        assert_eq!(
            registry.get(PKS_ADAPTER_PATH).unwrap().description(),
            "connectivity checker"
        );
    }

    #[test]
    fn test_report_serialization() {
        let report = ConnectivityReport::with_certificate(
            PresentedCertificate::new("ab", "PEM").with_subject("CN=pks"),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["certificate"]["fingerprint"], "ab");
        assert_eq!(json["certificate"]["subject"], "CN=pks");

        let json = serde_json::to_value(ConnectivityReport::reachable()).unwrap();
        assert!(json.get("certificate").is_none());
    }
}
