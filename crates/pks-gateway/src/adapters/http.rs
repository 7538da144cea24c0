//! HTTP reachability adapter
//!
//! Probes both addresses with a plain GET. Any HTTP response, whatever its
//! status, counts as reachable. The adapter does not inspect peer
//! certificates, so it never asks for certificate acceptance.
//!
//! Note: Requires the `http-adapter` feature.

use async_trait::async_trait;
use pks_core::ValidatedAddresses;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{AdapterError, ConnectivityChecker, ConnectivityReport};

/// Reachability adapter backed by reqwest
pub struct HttpConnectivityChecker {
    client: reqwest::Client,
}

impl HttpConnectivityChecker {
    /// Create a checker whose probes give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, AdapterError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    async fn probe(&self, url: &Url) -> Result<(), AdapterError> {
        match self.client.get(url.as_str()).send().await {
            Ok(response) => {
                debug!(url = %url, status = %response.status(), "Endpoint responded");
                Ok(())
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Endpoint unreachable");
                Err(AdapterError::Unreachable {
                    address: url.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl ConnectivityChecker for HttpConnectivityChecker {
    async fn check(&self, addresses: &ValidatedAddresses) -> Result<ConnectivityReport, AdapterError> {
        self.probe(&addresses.auth).await?;
        self.probe(&addresses.api).await?;
        Ok(ConnectivityReport::reachable())
    }

    fn description(&self) -> &str {
        "http reachability probe"
    }
}
