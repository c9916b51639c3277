//! Variable-file discovery and parsing.
//!
//! [`VarsLoader`] is the seam between the collector and whatever mechanism
//! the surrounding engine uses to locate and parse variable files.
//! [`FileVarsLoader`] is the filesystem implementation: name-based probing
//! plus recursive directory expansion, parsing YAML, JSON and TOML into
//! generic values.

use crate::vars::Vars;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub mod file;

pub use file::FileVarsLoader;

/// File discovery and parsing primitive used by the collector.
///
/// Errors are opaque on purpose: the collector swallows them per entity, so
/// implementations are free to fail with whatever is most descriptive.
pub trait VarsLoader {
    /// Enumerate the variable files that apply to `name` under `dir`, in
    /// load order. Later files take higher precedence downstream.
    fn find_vars_files(&self, dir: &Path, name: &str) -> Result<Vec<PathBuf>>;

    /// Load one variable file into a key/value mapping. An empty mapping is
    /// a valid result and contributes nothing.
    fn load_from_file(&self, path: &Path) -> Result<Vars>;
}
