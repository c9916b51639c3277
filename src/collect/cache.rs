//! Memoized variable-file discovery results.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Cache of discovered variable-file lists, keyed by entity name plus the
/// resolved directory that was searched.
///
/// The composite key matters: two entities probing the same directory find
/// different files, and the same entity name under two variable roots finds
/// different files again. Entries are never evicted and there is no
/// invalidation API; the first discovery wins for the cache's lifetime, and
/// dropping the cache (or the collector owning it) is the only refresh.
/// Absent directories are never recorded, so a directory created later is
/// still picked up by a fresh lookup.
#[derive(Debug, Default)]
pub struct DiscoveryCache {
    entries: HashMap<(String, PathBuf), Vec<PathBuf>>,
}

impl DiscoveryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached file list for `name` under `dir`, if one was recorded.
    pub fn get(&self, name: &str, dir: &Path) -> Option<&[PathBuf]> {
        self.entries.get(&(name.to_string(), dir.to_path_buf())).map(Vec::as_slice)
    }

    /// Record the file list discovered for `name` under `dir`. A repeated
    /// insert for the same key overwrites; all writers for a key compute
    /// the same list, so this is idempotent in practice.
    pub fn insert(&mut self, name: &str, dir: &Path, files: Vec<PathBuf>) {
        self.entries.insert((name.to_string(), dir.to_path_buf()), files);
    }

    pub fn contains(&self, name: &str, dir: &Path) -> bool {
        self.entries.contains_key(&(name.to_string(), dir.to_path_buf()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
