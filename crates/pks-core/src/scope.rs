//! Scope resolution for endpoint uniqueness
//!
//! Endpoint address pairs must be unique within a scope partition. The
//! partition is derived from the scope tags carried by the endpoint:
//!
//! | Tags                                   | Scope     |
//! |----------------------------------------|-----------|
//! | none recognized                        | `Global`  |
//! | `/tenants/{t}`                         | `Tenant`  |
//! | `/projects/{p}` (with or without tenant) | `Project` |
//! | `/tenants/{t}/groups/{g}`, or `/tenants/{t}` + `/groups/{g}` | `Group` |
//!
//! Every recognized marker of the winning kind is kept, so two tag sets
//! share a partition only when they carry the same markers. Partitions are
//! compared by equality only. A tenant scope and a group scope under the
//! same tenant are different partitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;
use url::form_urlencoded;

/// Prefix of tenant scope tags
pub const TENANT_PREFIX: &str = "/tenants/";
/// Prefix of project scope tags
pub const PROJECT_PREFIX: &str = "/projects/";
/// Path segment introducing a group, standalone or under a tenant
pub const GROUP_PREFIX: &str = "/groups/";

/// Uniqueness scope of an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Scope {
    Global,
    Tenant {
        tenants: BTreeSet<String>,
    },
    Project {
        projects: BTreeSet<String>,
    },
    Group {
        /// Every tenant named by the tags, including those of group tags
        tenants: BTreeSet<String>,
        /// `(tenant, group)` pairs
        groups: BTreeSet<(String, String)>,
    },
}

/// Scope markers recognized in a single tag
#[derive(Debug, PartialEq, Eq)]
enum ScopeTag<'a> {
    Tenant(&'a str),
    Project(&'a str),
    Group(&'a str),
    TenantGroup(&'a str, &'a str),
}

impl Scope {
    /// Resolve the scope of a set of tags
    ///
    /// Tag order and duplicates are irrelevant. Tags that are not scope
    /// markers are ignored.
    pub fn resolve<S: AsRef<str>>(tags: &[S]) -> Self {
        let mut tenants: BTreeSet<&str> = BTreeSet::new();
        let mut projects: BTreeSet<&str> = BTreeSet::new();
        let mut groups: BTreeSet<(&str, &str)> = BTreeSet::new();
        let mut standalone_groups: BTreeSet<&str> = BTreeSet::new();

        for tag in tags {
            match parse_tag(tag.as_ref()) {
                Some(ScopeTag::Tenant(t)) => {
                    tenants.insert(t);
                }
                Some(ScopeTag::Project(p)) => {
                    projects.insert(p);
                }
                Some(ScopeTag::Group(g)) => {
                    standalone_groups.insert(g);
                }
                Some(ScopeTag::TenantGroup(t, g)) => {
                    groups.insert((t, g));
                }
                None => debug!(tag = %tag.as_ref(), "Ignoring non-scope tag"),
            }
        }

        if !projects.is_empty() {
            return Scope::Project {
                projects: owned(projects),
            };
        }

        // A standalone group tag belongs to every tenant the tags name
        tenants.extend(groups.iter().map(|(t, _)| *t));
        for group in standalone_groups {
            if tenants.is_empty() {
                debug!(group = %group, "Ignoring group tag without tenant");
            }
            groups.extend(tenants.iter().map(|t| (*t, group)));
        }

        match (groups.is_empty(), tenants.is_empty()) {
            (false, _) => Scope::Group {
                tenants: owned(tenants),
                groups: groups
                    .into_iter()
                    .map(|(t, g)| (t.to_string(), g.to_string()))
                    .collect(),
            },
            (true, false) => Scope::Tenant {
                tenants: owned(tenants),
            },
            (true, true) => Scope::Global,
        }
    }

    /// Stable key identifying the partition of this scope
    ///
    /// Ids are form-urlencoded, so the `:`, `,` and `/` separators never
    /// occur inside them and distinct scopes always yield distinct keys.
    pub fn partition_key(&self) -> String {
        match self {
            Scope::Global => "global".to_string(),
            Scope::Tenant { tenants } => format!("tenant:{}", join(tenants.iter().map(|t| escape(t)))),
            Scope::Project { projects } => {
                format!("project:{}", join(projects.iter().map(|p| escape(p))))
            }
            Scope::Group { tenants, groups } => format!(
                "group:{}:{}",
                join(tenants.iter().map(|t| escape(t))),
                join(groups.iter().map(|(t, g)| format!("{}/{}", escape(t), escape(g))))
            ),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.partition_key())
    }
}

fn owned(ids: BTreeSet<&str>) -> BTreeSet<String> {
    ids.into_iter().map(str::to_string).collect()
}

fn escape(id: &str) -> String {
    form_urlencoded::byte_serialize(id.as_bytes()).collect()
}

fn join(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join(",")
}

fn parse_tag(tag: &str) -> Option<ScopeTag<'_>> {
    if let Some(rest) = tag.strip_prefix(TENANT_PREFIX) {
        return match rest.split_once(GROUP_PREFIX) {
            Some((tenant, group)) if !tenant.is_empty() && !group.is_empty() => {
                Some(ScopeTag::TenantGroup(tenant, group))
            }
            Some(_) => None,
            None if !rest.is_empty() => Some(ScopeTag::Tenant(rest)),
            None => None,
        };
    }
    if let Some(project) = tag.strip_prefix(PROJECT_PREFIX).filter(|p| !p.is_empty()) {
        return Some(ScopeTag::Project(project));
    }
    if let Some(group) = tag.strip_prefix(GROUP_PREFIX).filter(|g| !g.is_empty()) {
        return Some(ScopeTag::Group(group));
    }
    None
}
