//! Pluggable cache interface for the SOAP toolkit
//!
//! The toolkit accepts a cache backend at client construction time and calls
//! exactly two operations on it while resolving schema documents. This
//! module defines that seam, a null backend for opting out of caching, and
//! wires the disk-backed [`FileCache`] into it.

use crate::file::FileCache;

/// The cache surface the toolkit consumes
///
/// `put` hands the bytes back so lookups can be written as pass-through
/// expressions; a failed write still returns them unchanged. `get` never
/// fails, only misses.
pub trait Cache {
    /// Returns the cached bytes for `key`, or `None` on a miss
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores `bytes` under `key`, returning them unchanged
    fn put(&self, key: &str, bytes: Vec<u8>) -> Vec<u8>;
}

/// A backend that caches nothing
///
/// Every `get` is a miss and every `put` is a pass-through.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl Cache for NoCache {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn put(&self, _key: &str, bytes: Vec<u8>) -> Vec<u8> {
        bytes
    }
}

impl Cache for FileCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        FileCache::get(self, key)
    }

    fn put(&self, key: &str, bytes: Vec<u8>) -> Vec<u8> {
        FileCache::put(self, key, bytes)
    }
}
