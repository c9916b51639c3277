//! Aggregating host/group variable loading for inventory-driven configuration.
//!
//! A conventional inventory loader resolves `host_vars/` and `group_vars/`
//! files with "last file wins": every key ends up holding the single value
//! from the highest-precedence file. This crate keeps that mechanism intact
//! and adds an aggregating side channel:
//!
//! - [`VarsCollector`] walks the same variable-file locations but appends
//!   every value found for a key to an ordered per-key list, partitioned by
//!   entity kind, and returns the lists under the fixed keys
//!   `_merged_host_vars` and `_merged_group_vars` for the surrounding engine
//!   to publish into its variables environment.
//! - [`merge_vars`] flattens the published lists for one key, optionally
//!   seeded with caller values and the key's ordinary resolved value, into a
//!   single ordered list.
//!
//! File discovery and parsing sit behind the [`VarsLoader`] seam;
//! [`FileVarsLoader`] is the filesystem implementation (YAML, JSON and TOML).
//!
//! ```no_run
//! use merge_vars::{merge_vars, Entity, FileVarsLoader, MergeOptions, VarsCollector};
//! use serde_json::Value;
//! use std::path::Path;
//!
//! let loader = FileVarsLoader::new();
//! let mut collector = VarsCollector::new();
//!
//! let entities = [Entity::host("web01"), Entity::group("webservers")];
//! let environment = collector.get_vars(&loader, Path::new("inventory"), &entities);
//!
//! let packages = merge_vars(
//!     &[Value::from("extra_packages")],
//!     &environment,
//!     &MergeOptions::default(),
//! )?;
//! println!("{} values for extra_packages", packages.len());
//! # Ok::<(), merge_vars::MergeError>(())
//! ```

pub mod collect;
pub mod error;
pub mod inventory;
pub mod loader;
pub mod merge;
pub mod vars;

pub use collect::{CollectReport, DiscoveryCache, SkipReason, SkippedEntity, VarsCollector};
pub use error::MergeError;
pub use inventory::{Entity, EntityKind};
pub use loader::{FileVarsLoader, VarsLoader};
pub use merge::{merge_vars, MergeOptions};
pub use vars::Vars;
