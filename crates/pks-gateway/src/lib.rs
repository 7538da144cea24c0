//! PKS Endpoint Gateway
//!
//! Registers external PKS control-plane endpoints. A registration is
//! accepted only if:
//! - both the API and the auth (UAA) address are http(s) URLs with a host
//! - no other endpoint in the same scope partition carries the same
//!   address pair
//! - the target is reachable and its certificate accepted, unless the
//!   caller already acknowledged the host address
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /ready` - Readiness check with endpoint count and adapters
//! - `PUT /v1/pks/endpoints` - Create or update an endpoint
//! - `GET /v1/pks/endpoints` - List endpoints, optionally by `scope_tag`
//! - `GET /v1/pks/endpoints/{id}` - Fetch one endpoint
//! - `DELETE /v1/pks/endpoints/{id}` - Remove an endpoint
//! - `PUT /v1/pks/endpoints/validate` - Check connectivity without storing

pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod storage;

pub use adapters::{AdapterRegistry, ConnectivityChecker, ConnectivityReport, PKS_ADAPTER_PATH};
pub use api::create_router;
pub use api::handlers::AppState;
pub use config::{ConfigError, GatewayConfig};
pub use core::{EndpointRegistrar, RegistrationOutcome};
pub use storage::{EndpointStore, MemoryStore, StorageError};
