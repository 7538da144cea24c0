//! Endpoint types shared by the validator, resolver and gateway

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::scope::Scope;

/// Custom properties attached to an endpoint
pub type CustomProperties = HashMap<String, String>;

/// Candidate endpoint as submitted by a caller
///
/// `id` is absent on create and identifies the target record on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescriptor {
    /// Identifier of an existing record (update only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    /// Control-plane API address (e.g. "https://pks.example.com:9021")
    #[serde(default)]
    pub api_address: String,

    /// Token-issuing (UAA) address (e.g. "https://pks.example.com:8443")
    #[serde(default)]
    pub auth_address: String,

    /// Tenant / project / group markers
    #[serde(default)]
    pub scope_tags: Vec<String>,

    /// Derived artifacts such as certificate trust links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_properties: Option<CustomProperties>,
}

impl EndpointDescriptor {
    /// Create a descriptor for the given address pair
    pub fn new(api_address: impl Into<String>, auth_address: impl Into<String>) -> Self {
        Self {
            api_address: api_address.into(),
            auth_address: auth_address.into(),
            ..Self::default()
        }
    }

    /// Attach scope tags
    pub fn with_scope_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Target an existing record
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Resolve the uniqueness scope of this descriptor
    pub fn scope(&self) -> Scope {
        Scope::resolve(&self.scope_tags)
    }
}

/// Persisted endpoint record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRecord {
    /// Immutable identifier assigned at creation
    pub id: Uuid,

    pub api_address: String,

    pub auth_address: String,

    pub scope_tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_properties: Option<CustomProperties>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl EndpointRecord {
    /// Build a new record from a validated descriptor
    ///
    /// Any id carried by the descriptor is ignored; `id` is authoritative.
    pub fn create(id: Uuid, endpoint: EndpointDescriptor) -> Self {
        let now = Utc::now();
        Self {
            id,
            api_address: endpoint.api_address,
            auth_address: endpoint.auth_address,
            scope_tags: endpoint.scope_tags,
            custom_properties: endpoint.custom_properties,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the mutable fields of a descriptor in place
    ///
    /// Addresses and scope tags are replaced. Custom properties are merged,
    /// with the descriptor's values overwriting existing keys.
    pub fn apply(&mut self, endpoint: EndpointDescriptor) {
        self.api_address = endpoint.api_address;
        self.auth_address = endpoint.auth_address;
        self.scope_tags = endpoint.scope_tags;

        if let Some(props) = endpoint.custom_properties {
            self.custom_properties
                .get_or_insert_with(CustomProperties::new)
                .extend(props);
        }

        self.updated_at = Utc::now();
    }

    /// Resolve the uniqueness scope of this record
    pub fn scope(&self) -> Scope {
        Scope::resolve(&self.scope_tags)
    }

    /// Check whether this record carries the given address pair
    pub fn has_addresses(&self, api_address: &str, auth_address: &str) -> bool {
        self.api_address == api_address && self.auth_address == auth_address
    }

    /// Look up a custom property
    pub fn custom_property(&self, key: &str) -> Option<&str> {
        self.custom_properties
            .as_ref()
            .and_then(|props| props.get(key))
            .map(String::as_str)
    }
}

/// Certificate presented by a target during connectivity validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentedCertificate {
    /// Opaque fingerprint identifying the certificate
    pub fingerprint: String,

    /// PEM-encoded certificate chain
    pub pem: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl PresentedCertificate {
    pub fn new(fingerprint: impl Into<String>, pem: impl Into<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            pem: pem.into(),
            subject: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_wire_format() {
        let json = serde_json::json!({
            "apiAddress": "https://localhost",
            "authAddress": "https://localhost:8443",
            "scopeTags": ["/tenants/acme"]
        });

        let endpoint: EndpointDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(endpoint.api_address, "https://localhost");
        assert_eq!(endpoint.auth_address, "https://localhost:8443");
        assert_eq!(endpoint.scope_tags, vec!["/tenants/acme"]);
        assert!(endpoint.id.is_none());
        assert!(endpoint.custom_properties.is_none());
    }

    #[test]
    fn test_apply_replaces_addresses_and_merges_properties() {
        let mut initial = EndpointDescriptor::new("https://localhost", "https://localhost");
        initial.custom_properties = Some(CustomProperties::from([
            ("keep".to_string(), "1".to_string()),
            ("replace".to_string(), "old".to_string()),
        ]));
        let mut record = EndpointRecord::create(Uuid::new_v4(), initial);
        let created_at = record.created_at;

        let mut update = EndpointDescriptor::new("https://localhost", "http://some-other-host");
        update.custom_properties = Some(CustomProperties::from([(
            "replace".to_string(),
            "new".to_string(),
        )]));
        record.apply(update);

        assert_eq!(record.auth_address, "http://some-other-host");
        assert_eq!(record.custom_property("keep"), Some("1"));
        assert_eq!(record.custom_property("replace"), Some("new"));
        assert_eq!(record.created_at, created_at);
        assert!(record.updated_at >= created_at);
    }

    #[test]
    fn test_apply_without_properties_keeps_existing() {
        let mut initial = EndpointDescriptor::new("https://a", "https://b");
        initial.custom_properties = Some(CustomProperties::from([(
            "k".to_string(),
            "v".to_string(),
        )]));
        let mut record = EndpointRecord::create(Uuid::new_v4(), initial);

        record.apply(EndpointDescriptor::new("https://a", "https://c"));
        assert_eq!(record.custom_property("k"), Some("v"));
    }
}
