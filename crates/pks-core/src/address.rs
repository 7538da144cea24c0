//! Address validation for endpoint registration
//!
//! Each address goes through two checks, in order:
//! 1. the scheme, when one is present, must be `http` or `https`;
//! 2. the address must parse as an absolute URL with a non-empty host.
//!
//! For a descriptor the auth address is checked before the api address, so a
//! request with two bad addresses always reports the auth address.

use url::Url;

use crate::error::{RegistrationError, Result};
use crate::types::EndpointDescriptor;

/// Schemes accepted for control-plane addresses
pub const SUPPORTED_SCHEMES: [&str; 2] = ["http", "https"];

/// Validated address pair of an endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAddresses {
    pub api: Url,
    pub auth: Url,
}

/// Validate a single endpoint address
pub fn validate_address(address: &str) -> Result<Url> {
    if let Some(scheme) = explicit_scheme(address) {
        let scheme = scheme.to_ascii_lowercase();
        if !SUPPORTED_SCHEMES.contains(&scheme.as_str()) {
            return Err(RegistrationError::InvalidScheme(scheme));
        }
    }

    let url = Url::parse(address)
        .map_err(|_| RegistrationError::InvalidHostAddress(address.to_string()))?;

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(RegistrationError::InvalidHostAddress(address.to_string())),
    }
}

/// Validate both addresses of a descriptor, auth address first
pub fn validate_endpoint_addresses(endpoint: &EndpointDescriptor) -> Result<ValidatedAddresses> {
    let auth = validate_address(&endpoint.auth_address)?;
    let api = validate_address(&endpoint.api_address)?;
    Ok(ValidatedAddresses { api, auth })
}

/// Extract the scheme of an address if it starts with a syntactically valid one
///
/// scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn explicit_scheme(address: &str) -> Option<&str> {
    let (candidate, _) = address.split_once(':')?;
    let mut chars = candidate.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(candidate)
    } else {
        None
    }
}
