//! Aggregating variable collection.
//!
//! [`VarsCollector`] walks the applicable variable-file locations for each
//! entity and, instead of merging keys last-wins, appends every discovered
//! value for a key to an ordered per-key list, partitioned by entity kind.
//! Discovery results are memoized in a [`DiscoveryCache`] for the
//! collector's lifetime.
//!
//! Per-entity failures never escape: they are captured in a
//! [`CollectReport`] so the caller can see which entities contributed and
//! which were skipped, and why.

pub mod cache;
pub mod collector;

pub use cache::DiscoveryCache;
pub use collector::{CollectReport, SkipReason, SkippedEntity, VarsCollector};
