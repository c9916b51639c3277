//! Inventory entities: hosts and groups.
//!
//! Entities are owned by the surrounding inventory system; this crate only
//! reads their name and kind to decide which variable files apply.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two entity categories an inventory defines variables for.
///
/// The kind selects the subdirectory of the variable-file root and the
/// environment key under which the aggregated values travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Host,
    Group,
}

impl EntityKind {
    /// Fixed merge order: host values first, then group values.
    pub const ALL: [EntityKind; 2] = [EntityKind::Host, EntityKind::Group];

    /// Subdirectory of the variable-file root holding this kind's files.
    pub fn subdir(self) -> &'static str {
        match self {
            EntityKind::Host => "host_vars",
            EntityKind::Group => "group_vars",
        }
    }

    /// Environment key under which this kind's aggregation is published.
    pub fn merged_key(self) -> &'static str {
        match self {
            EntityKind::Host => "_merged_host_vars",
            EntityKind::Group => "_merged_group_vars",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Host => write!(f, "host"),
            EntityKind::Group => write!(f, "group"),
        }
    }
}

/// A host or group identifier from the inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    name: String,
    kind: EntityKind,
}

impl Entity {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self { name: name.into(), kind }
    }

    /// A host-kind entity.
    pub fn host(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Host)
    }

    /// A group-kind entity.
    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Group)
    }

    /// The inventory name, e.g. `web01` or `webservers`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_maps_to_subdir_and_published_key() {
        assert_eq!(EntityKind::Host.subdir(), "host_vars");
        assert_eq!(EntityKind::Group.subdir(), "group_vars");

        // The published key is always the subdirectory name with the
        // "_merged_" prefix.
        for kind in EntityKind::ALL {
            assert_eq!(kind.merged_key(), format!("_merged_{}", kind.subdir()));
        }
    }

    #[test]
    fn merge_order_is_host_then_group() {
        assert_eq!(EntityKind::ALL, [EntityKind::Host, EntityKind::Group]);
    }

    #[test]
    fn entity_round_trips_with_lowercase_kind() {
        let host = Entity::host("web01");
        let json = serde_json::to_string(&host).expect("serialize");
        assert_eq!(json, r#"{"name":"web01","kind":"host"}"#);

        let back: Entity = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, host);
    }
}
