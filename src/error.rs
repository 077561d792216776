//! Error types for the schema cache
//!
//! Only programmer-error-class faults surface to callers. Storage faults
//! (unwritable directory, unreadable entry, failed delete) are logged and
//! absorbed at the operation boundary, so they never appear here.

use thiserror::Error;

/// Errors that can escape the cache boundary
#[derive(Debug, Error)]
pub enum CacheError {
    /// More than one duration unit was supplied at once
    #[error("invalid duration: must be one of: months|weeks|days|hours|minutes|seconds")]
    InvalidDuration,

    /// A value could not be serialized for caching
    #[error("failed to serialize value for caching: {0}")]
    Serialization(#[from] serde_json::Error),
}
