//! File-backed byte cache
//!
//! Stores raw byte blobs as flat files under a single directory, one file
//! per key. Entries expire lazily based on file age, and a version marker
//! gates the whole directory: the first construction that notices a toolkit
//! upgrade wipes every entry before the cache is used.
//!
//! Every operation that touches the filesystem is best-effort. Faults are
//! logged at debug level and absorbed; callers see a miss (`None`) or get
//! their input back, never an error.

use std::fs::{self, File};
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::duration::{CacheDuration, DurationOptions};
use crate::error::CacheError;

/// File name prefix marking files owned by this cache family
pub(crate) const FILE_PREFIX: &str = "schemacache";

/// Version marker file name; unprefixed so `clear` leaves it alone
const VERSION_FILE: &str = "version";

/// Entry suffix for raw byte entries
const BYTES_SUFFIX: &str = "gcf";

/// Subdirectory of the platform temp dir used when no location is given
const DEFAULT_SUBDIR: &str = "schemacache";

/// The default cache directory: the platform temp dir plus a fixed subfolder
pub(crate) fn default_location() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_SUBDIR)
}

/// A file-backed cache of raw byte blobs with age-based expiration
///
/// Each key maps to one file named `{prefix}-{key}.{suffix}` inside the
/// cache directory. Expiry is checked lazily when an entry is read; there is
/// no background sweep. Location and duration can be reconfigured after
/// construction and affect subsequent operations only.
#[derive(Debug, Clone)]
pub struct FileCache {
    /// Directory holding the entry files; created lazily on first write
    location: PathBuf,
    /// Entry lifetime; the default never expires
    duration: CacheDuration,
    /// Toolkit version stamped on the directory
    version: String,
    /// Entry file suffix; the object layer substitutes its own
    suffix: &'static str,
}

impl FileCache {
    /// Creates a cache in the default location under the platform temp dir
    ///
    /// `version` is the toolkit version string used for the directory-wide
    /// generation check: if the stored marker is missing, unreadable or
    /// different, every entry in the directory is removed and the marker is
    /// rewritten before the constructor returns.
    ///
    /// Fails only when `duration` sets more than one unit.
    pub fn new(
        version: impl Into<String>,
        duration: DurationOptions,
    ) -> Result<Self, CacheError> {
        Self::with_location(default_location(), version, duration)
    }

    /// Creates a cache in a specific directory
    pub fn with_location(
        location: impl Into<PathBuf>,
        version: impl Into<String>,
        duration: DurationOptions,
    ) -> Result<Self, CacheError> {
        Self::build(location.into(), version.into(), duration, BYTES_SUFFIX)
    }

    pub(crate) fn build(
        location: PathBuf,
        version: String,
        duration: DurationOptions,
        suffix: &'static str,
    ) -> Result<Self, CacheError> {
        let mut cache = Self {
            location,
            duration: CacheDuration::default(),
            version,
            suffix,
        };
        cache.set_duration(duration)?;
        cache.check_version();
        Ok(cache)
    }

    /// Replaces the entry lifetime; chainable
    ///
    /// Empty options leave the current duration unchanged. The new duration
    /// affects future validation decisions only.
    pub fn set_duration(&mut self, duration: DurationOptions) -> Result<&mut Self, CacheError> {
        if let Some(duration) = duration.resolve()? {
            self.duration = duration;
        }
        Ok(self)
    }

    /// Points the cache at a different directory; chainable
    ///
    /// Existing files are not moved or migrated.
    pub fn set_location(&mut self, location: impl Into<PathBuf>) -> &mut Self {
        self.location = location.into();
        self
    }

    /// The directory currently holding the entries
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Stores `bytes` under `key`, returning them unchanged
    ///
    /// The write fully replaces any previous entry for `key` and creates the
    /// cache directory if it is missing. On failure the bytes still come
    /// back and the fault is only logged: a broken cache must never break
    /// the workflow it accelerates.
    pub fn put(&self, key: &str, bytes: Vec<u8>) -> Vec<u8> {
        if let Err(e) = self.try_put(key, &bytes) {
            debug!(key, error = %e, "cache write failed");
        }
        bytes
    }

    fn try_put(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        self.try_ensure_dir()?;
        fs::write(self.entry_path(key), bytes)
    }

    /// Retrieves the bytes stored under `key`
    ///
    /// Returns `None` for a missing, expired or unreadable entry.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut file = self.get_reader(key)?;
        let mut bytes = Vec::new();
        match file.read_to_end(&mut bytes) {
            Ok(_) => Some(bytes),
            Err(e) => {
                debug!(key, error = %e, "cache read failed");
                None
            }
        }
    }

    /// Opens the entry under `key` for reading, validating its age first
    ///
    /// An entry past its duration is deleted during validation and reads as
    /// a miss.
    pub fn get_reader(&self, key: &str) -> Option<File> {
        let path = self.entry_path(key);
        self.validate(&path);
        match File::open(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    debug!(key, error = %e, "cache open failed");
                }
                None
            }
        }
    }

    /// Drains `source` into the entry for `key` and hands back a reader
    ///
    /// On success the reader is a fresh handle on the newly written file,
    /// positioned at the start. On a write failure the drained bytes are
    /// served from memory instead, and a source that could not be read at
    /// all is handed back as given, so the caller can always still consume
    /// its data. [`CachedReader::persisted`] tells the outcomes apart.
    pub fn put_reader<R: Read>(&self, key: &str, mut source: R) -> CachedReader<R> {
        let mut bytes = Vec::new();
        if let Err(e) = source.read_to_end(&mut bytes) {
            debug!(key, error = %e, "cache source read failed");
            return CachedReader::Source(source);
        }
        match self
            .try_put(key, &bytes)
            .and_then(|()| File::open(self.entry_path(key)))
        {
            Ok(file) => CachedReader::File(file),
            Err(e) => {
                debug!(key, error = %e, "cache write failed");
                CachedReader::Buffered(Cursor::new(bytes))
            }
        }
    }

    /// Deletes the entry for `key` if present; an absent entry is fine
    pub fn purge(&self, key: &str) {
        let path = self.entry_path(key);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != io::ErrorKind::NotFound {
                debug!(key, error = %e, "cache purge failed");
            }
        }
    }

    /// Removes every entry file owned by this cache family
    ///
    /// Only files carrying the cache prefix are touched; subdirectories and
    /// unrelated files in the same directory are left alone. Both byte and
    /// object entries carry the prefix, so a clear covers both layers.
    pub fn clear(&self) {
        let entries = match fs::read_dir(&self.location) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    debug!(location = %self.location.display(), error = %e, "cache clear failed");
                }
                return;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            if entry.file_name().to_string_lossy().starts_with(FILE_PREFIX) {
                debug!(path = %path.display(), "removing cache entry");
                if let Err(e) = fs::remove_file(&path) {
                    debug!(path = %path.display(), error = %e, "cache clear failed");
                }
            }
        }
    }

    /// Creates the cache directory (and parents) if missing; idempotent
    ///
    /// Failures are logged and absorbed.
    pub fn ensure_dir(&self) {
        if let Err(e) = self.try_ensure_dir() {
            debug!(location = %self.location.display(), error = %e, "cache directory creation failed");
        }
    }

    fn try_ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.location)
    }

    /// Deletes the file behind `path` if it has outlived the configured
    /// duration; a zero duration means entries never expire
    fn validate(&self, path: &Path) {
        if self.duration.is_forever() {
            return;
        }
        let Ok(metadata) = fs::metadata(path) else {
            return;
        };
        // Creation time is not reported on every filesystem; fall back to
        // the last modification, which for a cache entry is the last put.
        let created = metadata.created().or_else(|_| metadata.modified());
        let Ok(created) = created else {
            return;
        };
        let created: DateTime<Utc> = created.into();
        let expired = match self.duration.expires_at(created) {
            Some(expiry) => Utc::now() > expiry,
            None => false,
        };
        if expired {
            debug!(path = %path.display(), "cache entry expired, removing");
            if let Err(e) = fs::remove_file(path) {
                debug!(path = %path.display(), error = %e, "failed to remove expired entry");
            }
        }
    }

    /// Compares the stored version marker against the toolkit version and
    /// wipes the directory on mismatch
    ///
    /// Runs once, at construction. This is the only path that evicts
    /// unexpired entries.
    fn check_version(&self) {
        let marker = self.location.join(VERSION_FILE);
        let stored = fs::read_to_string(&marker).ok();
        if stored.as_deref() == Some(self.version.as_str()) {
            return;
        }
        debug!(current = %self.version, "cache version marker stale or missing, clearing");
        self.clear();
        if let Err(e) = self
            .try_ensure_dir()
            .and_then(|()| fs::write(&marker, &self.version))
        {
            debug!(error = %e, "failed to write cache version marker");
        }
    }

    /// Path of the entry file for `key`: `{prefix}-{key}.{suffix}`
    pub(crate) fn entry_path(&self, key: &str) -> PathBuf {
        self.location
            .join(format!("{}-{}.{}", FILE_PREFIX, key, self.suffix))
    }
}

/// Reader returned by [`FileCache::put_reader`]
///
/// The caller always gets its data back; the variant is the side channel
/// for whether the write actually persisted.
#[derive(Debug)]
pub enum CachedReader<R> {
    /// Fresh handle on the newly written cache file
    File(File),
    /// The write failed after the source was drained; serves from memory
    Buffered(Cursor<Vec<u8>>),
    /// The source could not be read; handed back as given
    Source(R),
}

impl<R> CachedReader<R> {
    /// Whether the content was persisted to the cache
    pub fn persisted(&self) -> bool {
        matches!(self, CachedReader::File(_))
    }
}

impl<R: Read> Read for CachedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            CachedReader::File(file) => file.read(buf),
            CachedReader::Buffered(cursor) => cursor.read(buf),
            CachedReader::Source(source) => source.read(buf),
        }
    }
}
