//! Disk-backed expiring cache for SOAP toolkit schema documents
//!
//! A SOAP client re-parses the remote WSDL/XSD schema on every process start
//! unless the toolkit is handed a cache backend. This crate provides that
//! backend: a directory of flat files keyed by opaque identifiers, with
//! file-age expiration and a whole-directory version gate that wipes stale
//! entries when the toolkit is upgraded.
//!
//! The cache is best-effort by contract: storage faults are logged and
//! absorbed, and every miss, including one caused by a fault, just sends the
//! caller back to the slower schema fetch it was trying to avoid. Only
//! programmer errors escape: an over-specified duration and an
//! unserializable value (see [`CacheError`]).
//!
//! # Limitations
//!
//! Writes are plain whole-file overwrites, not atomic renames. Concurrent
//! writers to the same key race (last writer wins) and a concurrent reader
//! may observe a partial write. The cache accelerates a single client
//! instance's own schema lookups; multi-writer use needs an external lock.

pub mod duration;
pub mod error;
pub mod file;
pub mod object;
pub mod store;

pub use duration::{CacheDuration, DurationOptions, DurationUnit};
pub use error::CacheError;
pub use file::{CachedReader, FileCache};
pub use object::ObjectCache;
pub use store::{Cache, NoCache};
