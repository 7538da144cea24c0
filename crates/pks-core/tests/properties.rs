//! Property-Based Tests for endpoint validation and scoping
//!
//! These tests check the registration rules for arbitrary inputs:
//! 1. http/https addresses with a host always validate
//! 2. any other scheme is rejected and named in the message
//! 3. scope resolution ignores tag order and separates distinct partitions,
//!    whatever characters the ids contain
//! 4. trust links overwrite previous values

use proptest::prelude::*;
use pks_core::{
    store_cert_link, validate_address, validate_endpoint_addresses, EndpointDescriptor,
    RegistrationError, Scope,
};

fn host_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,12}(\\.[a-z]{2,6}){0,2}"
}

fn scheme_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9+.-]{0,7}".prop_filter("supported schemes excluded", |s| {
        s != "http" && s != "https"
    })
}

fn id_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9-]{1,16}"
}

// =============================================================================
// Address validation
// =============================================================================

proptest! {
    #[test]
    fn prop_http_and_https_hosts_validate(
        host in host_strategy(),
        secure in any::<bool>(),
        port in proptest::option::of(1u16..=u16::MAX),
    ) {
        let scheme = if secure { "https" } else { "http" };
        let address = match port {
            Some(port) => format!("{}://{}:{}", scheme, host, port),
            None => format!("{}://{}", scheme, host),
        };

        let url = validate_address(&address);
        prop_assert!(url.is_ok(), "{} should validate: {:?}", address, url);
    }

    #[test]
    fn prop_unsupported_scheme_is_named(
        scheme in scheme_strategy(),
        host in host_strategy(),
    ) {
        let address = format!("{}://{}", scheme, host);
        let err = validate_address(&address).unwrap_err();

        prop_assert_eq!(
            err.to_string(),
            format!("Unsupported scheme, must be http or https: {}", scheme)
        );
    }

    #[test]
    fn prop_auth_address_reported_first(
        auth_scheme in scheme_strategy(),
        api_scheme in scheme_strategy(),
    ) {
        let endpoint = EndpointDescriptor::new(
            format!("{}://api", api_scheme),
            format!("{}://auth", auth_scheme),
        );

        prop_assert_eq!(
            validate_endpoint_addresses(&endpoint).unwrap_err(),
            RegistrationError::InvalidScheme(auth_scheme)
        );
    }
}

// =============================================================================
// Scope resolution
// =============================================================================

proptest! {
    #[test]
    fn prop_scope_ignores_tag_order(
        tenants in proptest::collection::vec(id_strategy(), 0..3),
        projects in proptest::collection::vec(id_strategy(), 0..3),
        groups in proptest::collection::vec(id_strategy(), 0..3),
    ) {
        let mut tags: Vec<String> = tenants.iter().map(|t| format!("/tenants/{}", t)).collect();
        tags.extend(projects.iter().map(|p| format!("/projects/{}", p)));
        tags.extend(groups.iter().map(|g| format!("/groups/{}", g)));

        let mut reversed = tags.clone();
        reversed.reverse();

        prop_assert_eq!(Scope::resolve(&tags), Scope::resolve(&reversed));
    }

    #[test]
    fn prop_distinct_tenants_are_distinct_partitions(
        a in id_strategy(),
        b in id_strategy(),
    ) {
        prop_assume!(a != b);
        let scope_a = Scope::resolve(&[format!("/tenants/{}", a)]);
        let scope_b = Scope::resolve(&[format!("/tenants/{}", b)]);

        prop_assert_ne!(scope_a.partition_key(), scope_b.partition_key());
    }

    #[test]
    fn prop_distinct_projects_are_distinct_partitions(
        a in id_strategy(),
        b in id_strategy(),
    ) {
        prop_assume!(a != b);
        let scope_a = Scope::resolve(&[format!("/projects/{}", a)]);
        let scope_b = Scope::resolve(&[format!("/projects/{}", b)]);

        prop_assert_ne!(scope_a, scope_b);
    }

    #[test]
    fn prop_group_differs_from_its_tenant(
        tenant in id_strategy(),
        group in id_strategy(),
    ) {
        let tenant_scope = Scope::resolve(&[format!("/tenants/{}", tenant)]);
        let group_scope = Scope::resolve(&[format!("/tenants/{}/groups/{}", tenant, group)]);

        prop_assert_ne!(tenant_scope.partition_key(), group_scope.partition_key());
        prop_assert_eq!(
            group_scope,
            Scope::resolve(&[format!("/groups/{}", group), format!("/tenants/{}", tenant)])
        );
    }

    #[test]
    fn prop_distinct_tenant_sets_are_distinct_partitions(
        a in proptest::collection::btree_set(id_strategy(), 1..4),
        b in proptest::collection::btree_set(id_strategy(), 1..4),
    ) {
        prop_assume!(a != b);
        let tags_a: Vec<String> = a.iter().map(|t| format!("/tenants/{}", t)).collect();
        let tags_b: Vec<String> = b.iter().map(|t| format!("/tenants/{}", t)).collect();

        prop_assert_ne!(
            Scope::resolve(&tags_a).partition_key(),
            Scope::resolve(&tags_b).partition_key()
        );
    }

    #[test]
    fn prop_partition_key_matches_scope_equality(
        tenant_a in "[a-z:,/%+ ]{1,6}",
        group_a in "[a-z:,/%+ ]{1,6}",
        tenant_b in "[a-z:,/%+ ]{1,6}",
        group_b in "[a-z:,/%+ ]{1,6}",
    ) {
        let a = Scope::resolve(&[format!("/tenants/{}/groups/{}", tenant_a, group_a)]);
        let b = Scope::resolve(&[format!("/tenants/{}/groups/{}", tenant_b, group_b)]);

        prop_assert_eq!(a == b, a.partition_key() == b.partition_key());
    }
}

// =============================================================================
// Trust links
// =============================================================================

proptest! {
    #[test]
    fn prop_cert_link_last_write_wins(
        key in "[a-zA-Z_]{1,20}",
        values in proptest::collection::vec("[ -~]{0,40}", 1..5),
    ) {
        let mut endpoint = EndpointDescriptor::default();
        for value in &values {
            store_cert_link(&mut endpoint, key.clone(), value.clone());
        }

        let props = endpoint.custom_properties.unwrap();
        prop_assert_eq!(props.len(), 1);
        prop_assert_eq!(props.get(&key), values.last());
    }
}
