//! # PKS Core
//!
//! Domain types and validation rules for registering external PKS
//! (Pivotal Container Service) control-plane endpoints.
//!
//! ## Key Concepts
//!
//! - **Endpoint**: an API address plus an auth (UAA) address, tagged with
//!   scope markers
//! - **Scope partition**: the boundary (global / tenant / project / group)
//!   within which an address pair must be unique
//! - **Trust link**: reference to an accepted certificate stored in the
//!   endpoint's custom properties
//!
//! This crate performs no I/O. Storage, connectivity checks and the HTTP
//! surface live in `pks-gateway`.

pub mod address;
pub mod error;
pub mod request;
pub mod scope;
pub mod trust;
pub mod types;

pub use address::{validate_address, validate_endpoint_addresses, ValidatedAddresses};
pub use error::{RegistrationError, Result};
pub use request::{ConfirmationState, Registration, RegistrationCommand, RegistrationRequest};
pub use scope::Scope;
pub use trust::{store_cert_link, TRUST_CERT_LINK_PROPERTY};
pub use types::{CustomProperties, EndpointDescriptor, EndpointRecord, PresentedCertificate};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
