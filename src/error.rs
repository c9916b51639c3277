//! Error types for the merger's user-facing failures.
//!
//! Collector-side problems never surface as errors: they are captured per
//! entity in a [`CollectReport`](crate::collect::CollectReport) and the
//! default driver discards them, deferring hard-error reporting to the
//! conventional variable loading that runs alongside the collector.

use thiserror::Error;

/// Errors surfaced by [`merge_vars`](crate::merge::merge_vars).
///
/// Both variants are fatal to the single lookup call, not to the process.
#[derive(Error, Debug)]
pub enum MergeError {
    /// The positional terms were not exactly one string key.
    #[error("merge_vars expects a single string term: {reason}")]
    InvalidArgument { reason: String },

    /// The `initial` option was not a list.
    #[error("merge_vars initial value must be a list, got {got}")]
    InvalidConfiguration { got: String },
}
