//! The aggregation pass over host and group variable files.

use crate::collect::cache::DiscoveryCache;
use crate::inventory::{Entity, EntityKind};
use crate::loader::VarsLoader;
use crate::vars::Vars;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::{env, fs};
use tracing::debug;

/// Why an entity contributed nothing to a collection pass.
#[derive(Debug)]
pub enum SkipReason {
    /// The entity name is an absolute filesystem path. Connection
    /// mechanisms can synthesize such names (chroot-style targets); they
    /// must never be joined into a variable-file location.
    PathLikeName,
    /// Discovery or loading failed; the entity's entire contribution was
    /// abandoned.
    Failed(anyhow::Error),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::PathLikeName => write!(f, "name looks like an absolute path"),
            SkipReason::Failed(error) => write!(f, "{error:#}"),
        }
    }
}

/// One skipped entity and the reason it was skipped.
#[derive(Debug)]
pub struct SkippedEntity {
    pub name: String,
    pub reason: SkipReason,
}

/// Outcome of one [`VarsCollector::collect`] call: which entities
/// contributed and which were skipped.
///
/// The convenience entry point [`VarsCollector::get_vars`] logs and
/// discards this; callers that want to act on per-entity failures use
/// [`VarsCollector::collect`] directly.
#[derive(Debug, Default)]
pub struct CollectReport {
    pub succeeded: Vec<String>,
    pub skipped: Vec<SkippedEntity>,
}

/// Collects every value defined for a variable key across the applicable
/// host and group variable files into an ordered per-key list.
///
/// Unlike the conventional last-wins resolution running alongside it, the
/// collector never merges: each file that defines a key contributes exactly
/// one element to that key's list, in file-discovery order, which in turn
/// follows the caller's entity order. The per-kind aggregations are
/// returned under the fixed keys `_merged_host_vars` and
/// `_merged_group_vars` for the surrounding engine to publish into its
/// variables environment.
///
/// Discovery is memoized in a [`DiscoveryCache`] owned by the collector, so
/// the collector should live as long as the engine session. Files added to
/// an already-discovered directory are not seen until the collector is
/// dropped; absent directories are never cached, so one created later still
/// is.
pub struct VarsCollector {
    cache: DiscoveryCache,
    caching: bool,
}

impl VarsCollector {
    /// Collector with a fresh cache and caching enabled.
    pub fn new() -> Self {
        Self::with_cache(DiscoveryCache::new())
    }

    /// Collector reusing an existing discovery cache, e.g. one the engine
    /// carries across sessions of its own.
    pub fn with_cache(cache: DiscoveryCache) -> Self {
        Self { cache, caching: true }
    }

    /// Set whether discovery results are memoized (default) or every call
    /// re-scans the filesystem.
    pub fn caching(mut self, caching: bool) -> Self {
        self.caching = caching;
        self
    }

    /// The discovery cache in its current state.
    pub fn cache(&self) -> &DiscoveryCache {
        &self.cache
    }

    /// Aggregate variable values for `entities` under `base_dir` and report
    /// per-entity outcomes.
    ///
    /// The returned mapping holds at most two entries, one per kind that
    /// received at least one key; a kind with no discovered data produces
    /// no entry. No error ever escapes: every per-entity failure is
    /// recorded in the report and processing continues with the next
    /// entity.
    pub fn collect<L: VarsLoader + ?Sized>(
        &mut self,
        loader: &L,
        base_dir: &Path,
        entities: &[Entity],
    ) -> (Vars, CollectReport) {
        let mut report = CollectReport::default();
        let mut aggregated: HashMap<EntityKind, Vars> = HashMap::new();

        for entity in entities {
            if Path::new(entity.name()).is_absolute() {
                report.skipped.push(SkippedEntity {
                    name: entity.name().to_string(),
                    reason: SkipReason::PathLikeName,
                });
                continue;
            }

            match self.entity_pairs(loader, base_dir, entity) {
                Ok(pairs) => {
                    let kind_vars = aggregated.entry(entity.kind()).or_default();
                    for (key, value) in pairs {
                        let slot =
                            kind_vars.entry(key).or_insert_with(|| Value::Array(Vec::new()));
                        // Only arrays are ever inserted above.
                        if let Value::Array(list) = slot {
                            list.push(value);
                        }
                    }
                    report.succeeded.push(entity.name().to_string());
                }
                Err(error) => report.skipped.push(SkippedEntity {
                    name: entity.name().to_string(),
                    reason: SkipReason::Failed(error),
                }),
            }
        }

        let mut published = Vars::new();
        for kind in EntityKind::ALL {
            if let Some(kind_vars) = aggregated.remove(&kind) {
                if !kind_vars.is_empty() {
                    published.insert(kind.merged_key().to_string(), Value::Object(kind_vars));
                }
            }
        }
        (published, report)
    }

    /// [`collect`](Self::collect), logging each skipped entity at debug
    /// level and discarding the report. Hard-error reporting is deferred to
    /// the authoritative variable loading running alongside the collector.
    pub fn get_vars<L: VarsLoader + ?Sized>(
        &mut self,
        loader: &L,
        base_dir: &Path,
        entities: &[Entity],
    ) -> Vars {
        let (published, report) = self.collect(loader, base_dir, entities);
        for skipped in &report.skipped {
            debug!(entity = %skipped.name, reason = %skipped.reason, "skipped entity");
        }
        published
    }

    /// Every key/value pair this entity's files define, in file order then
    /// file-content order. Any failure abandons the whole entity, so a
    /// half-loaded contribution is never committed.
    fn entity_pairs<L: VarsLoader + ?Sized>(
        &mut self,
        loader: &L,
        base_dir: &Path,
        entity: &Entity,
    ) -> Result<Vec<(String, Value)>> {
        let dir = base_dir.join(entity.kind().subdir());
        let resolved = resolve_dir(&dir)?;

        let cached = if self.caching {
            self.cache.get(entity.name(), &resolved).map(<[PathBuf]>::to_vec)
        } else {
            None
        };
        let files = match cached {
            Some(files) => {
                debug!(entity = entity.name(), dir = %resolved.display(), "discovery cache hit");
                files
            }
            None if resolved.is_dir() => {
                debug!(entity = entity.name(), dir = %resolved.display(), "discovering vars files");
                let found = loader.find_vars_files(&resolved, entity.name())?;
                if self.caching {
                    self.cache.insert(entity.name(), &resolved, found.clone());
                }
                found
            }
            // Absent directory: nothing to load, and nothing is cached, so
            // a directory created later is still found by a fresh lookup.
            None => Vec::new(),
        };

        let mut pairs = Vec::new();
        for file in &files {
            let vars = loader.load_from_file(file)?;
            for (key, value) in vars {
                pairs.push((key, value));
            }
        }
        Ok(pairs)
    }
}

impl Default for VarsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute, symlink-resolved form of `dir`, falling back to lexical
/// absolutization when the path does not exist so the cache key stays
/// well-defined.
fn resolve_dir(dir: &Path) -> Result<PathBuf> {
    match fs::canonicalize(dir) {
        Ok(resolved) => Ok(resolved),
        Err(_) if dir.is_absolute() => Ok(dir.to_path_buf()),
        Err(_) => {
            let cwd = env::current_dir().context("resolving working directory")?;
            Ok(cwd.join(dir))
        }
    }
}
