//! Certificate trust links on endpoints

use crate::types::{CustomProperties, EndpointDescriptor};

/// Custom property holding the link to the trusted certificate of an endpoint
pub const TRUST_CERT_LINK_PROPERTY: &str = "__trustCertLink";

/// Store an opaque certificate reference in the endpoint's custom properties
///
/// Creates the property map if absent and overwrites any previous value for
/// `key`. The value is not inspected.
pub fn store_cert_link(
    endpoint: &mut EndpointDescriptor,
    key: impl Into<String>,
    value: impl Into<String>,
) {
    endpoint
        .custom_properties
        .get_or_insert_with(CustomProperties::new)
        .insert(key.into(), value.into());
}
