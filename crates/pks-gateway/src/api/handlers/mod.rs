//! API request handlers

pub mod endpoints;
pub mod validate;

use std::sync::Arc;

use crate::adapters::AdapterRegistry;
use crate::config::GatewayConfig;
use crate::core::EndpointRegistrar;
use crate::storage::EndpointStore;

pub use endpoints::{
    delete_endpoint, get_endpoint, list_endpoints, register_endpoint, CertificateConfirmationResponse,
    ListEndpointsQuery, ListEndpointsResponse,
};
pub use validate::{validate_endpoint, ValidateResponse};

/// Application state shared across handlers
pub struct AppState {
    pub store: Arc<dyn EndpointStore>,
    pub adapters: Arc<AdapterRegistry>,
    pub registrar: EndpointRegistrar,
    pub config: GatewayConfig,
}

impl AppState {
    /// Wire the registrar to the given store and adapters
    pub fn new(
        store: Arc<dyn EndpointStore>,
        adapters: Arc<AdapterRegistry>,
        config: GatewayConfig,
    ) -> Self {
        let registrar = EndpointRegistrar::new(
            store.clone(),
            adapters.clone(),
            config.adapter_path.clone(),
            config.connect_timeout,
        );
        Self {
            store,
            adapters,
            registrar,
            config,
        }
    }
}

/// Parse an optional JSON body
///
/// An empty body or a literal `null` yields `None`, which registration
/// rejects as a missing body rather than a malformed one.
pub(crate) fn parse_optional_body<T>(body: &[u8]) -> Result<Option<T>, crate::api::error::ApiError>
where
    T: serde::de::DeserializeOwned,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map_err(|e| crate::api::error::ApiError::BadRequest(format!("Malformed JSON body: {}", e)))
}
