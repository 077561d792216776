//! Serialized-object cache
//!
//! Layers serde serialization over the byte cache so arbitrary values can be
//! cached by key. Object entries live in the same directory as byte entries
//! under their own suffix, and the layer self-heals: anything that fails to
//! deserialize is purged and read as a miss, so a storage format upgrade
//! invalidates old entries instead of crashing callers.

use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::duration::DurationOptions;
use crate::error::CacheError;
use crate::file::{default_location, FileCache};

/// Entry suffix distinguishing object entries from raw byte entries
const OBJECTS_SUFFIX: &str = "px";

/// On-disk format generation; bump when the envelope layout changes
const FORMAT: u32 = 1;

/// Envelope wrapped around every stored value
#[derive(Debug, Serialize, Deserialize)]
struct StoredObject<T> {
    format: u32,
    value: T,
}

/// A cache for serializable values, backed by [`FileCache`]
///
/// Shares the byte layer's directory machinery, expiration and version gate;
/// only the entry suffix and the serialize/deserialize step differ.
#[derive(Debug, Clone)]
pub struct ObjectCache {
    files: FileCache,
}

impl ObjectCache {
    /// Creates an object cache in the default location
    ///
    /// Same construction contract as [`FileCache::new`], including the
    /// version gate side effect.
    pub fn new(
        version: impl Into<String>,
        duration: DurationOptions,
    ) -> Result<Self, CacheError> {
        Self::with_location(default_location(), version, duration)
    }

    /// Creates an object cache in a specific directory
    pub fn with_location(
        location: impl Into<PathBuf>,
        version: impl Into<String>,
        duration: DurationOptions,
    ) -> Result<Self, CacheError> {
        Ok(Self {
            files: FileCache::build(location.into(), version.into(), duration, OBJECTS_SUFFIX)?,
        })
    }

    /// Replaces the entry lifetime; chainable
    pub fn set_duration(&mut self, duration: DurationOptions) -> Result<&mut Self, CacheError> {
        self.files.set_duration(duration)?;
        Ok(self)
    }

    /// Points the cache at a different directory; chainable
    pub fn set_location(&mut self, location: impl Into<PathBuf>) -> &mut Self {
        self.files.set_location(location);
        self
    }

    /// The directory currently holding the entries
    pub fn location(&self) -> &Path {
        self.files.location()
    }

    /// Retrieves and deserializes the value stored under `key`
    ///
    /// Returns `None` for a missing or expired entry. An entry that fails to
    /// deserialize for any reason, including an unrecognized format tag, is
    /// purged and also reads as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let file = self.files.get_reader(key)?;
        match serde_json::from_reader::<_, StoredObject<T>>(BufReader::new(file)) {
            Ok(stored) if stored.format == FORMAT => Some(stored.value),
            Ok(stored) => {
                debug!(key, format = stored.format, "incompatible cache entry format, purging");
                self.files.purge(key);
                None
            }
            Err(e) => {
                debug!(key, error = %e, "failed to deserialize cache entry, purging");
                self.files.purge(key);
                None
            }
        }
    }

    /// Serializes and stores `value` under `key`, returning it unchanged
    ///
    /// The write itself is best-effort like the byte layer's. A value that
    /// cannot be serialized is a caller error and propagates as
    /// [`CacheError::Serialization`].
    pub fn put<T: Serialize>(&self, key: &str, value: T) -> Result<T, CacheError> {
        let bytes = serde_json::to_vec(&StoredObject {
            format: FORMAT,
            value: &value,
        })?;
        self.files.put(key, bytes);
        Ok(value)
    }
}
